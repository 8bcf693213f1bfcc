use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tessera_domain::id::AccountId;
use tessera_domain::identity::ExportedCredential;

use crate::domain::types::DiscoveryStatus;
use crate::error::ConnectorError;
use crate::state::AppState;
use crate::usecase::search::{SearchNowInput, SearchNowUseCase};

// ── GET /accounts/{account_id}/discovery ──────────────────────────────────────

#[derive(Serialize)]
pub struct DiscoveryStatusResponse {
    pub status: DiscoveryStatus,
    pub attempts: u32,
    pub search_started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_at: Option<DateTime<Utc>>,
}

pub async fn discovery_status(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<DiscoveryStatusResponse>, ConnectorError> {
    let record = state
        .discovery
        .status(account_id)
        .ok_or(ConnectorError::DiscoveryNotStarted)?;
    Ok(Json(DiscoveryStatusResponse {
        status: record.status,
        attempts: record.attempts,
        search_started_at: record.search_started_at,
        code: record.code,
        found_at: record.found_at,
    }))
}

// ── POST /discovery/searches ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SearchNowRequest {
    pub credential: ExportedCredential,
}

#[derive(Serialize)]
pub struct SearchNowResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

pub async fn search_now(
    State(state): State<AppState>,
    Json(body): Json<SearchNowRequest>,
) -> Result<Json<SearchNowResponse>, ConnectorError> {
    let usecase = SearchNowUseCase {
        connector: state.connector.clone(),
    };
    let out = state
        .bridge
        .run(async move {
            usecase
                .execute(SearchNowInput {
                    credential: body.credential,
                })
                .await
        })
        .await?;
    Ok(Json(SearchNowResponse {
        found: out.found,
        code: out.code,
    }))
}
