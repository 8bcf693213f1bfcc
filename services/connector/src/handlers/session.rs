use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use tessera_domain::id::SessionId;
use tessera_domain::identity::AccountIdentity;

use crate::error::ConnectorError;
use crate::state::AppState;
use crate::usecase::request_code::{RequestCodeInput, RequestCodeUseCase};
use crate::usecase::verify_code::{VerifyCodeInput, VerifyCodeOutput, VerifyCodeUseCase};
use crate::usecase::verify_password::{VerifyPasswordInput, VerifyPasswordUseCase};

// ── POST /sessions ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestCodeRequest {
    pub phone: String,
}

#[derive(Serialize)]
pub struct RequestCodeResponse {
    pub session_id: SessionId,
}

pub async fn request_code(
    State(state): State<AppState>,
    Json(body): Json<RequestCodeRequest>,
) -> Result<impl IntoResponse, ConnectorError> {
    let usecase = RequestCodeUseCase {
        connector: state.connector.clone(),
        sessions: state.sessions.clone(),
    };
    let out = state
        .bridge
        .run(async move { usecase.execute(RequestCodeInput { phone: body.phone }).await })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RequestCodeResponse {
            session_id: out.session_id,
        }),
    ))
}

// ── POST /sessions/{session_id}/code ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub code: String,
}

#[derive(Serialize)]
pub struct VerifyCodeResponse {
    pub authenticated: bool,
    pub needs_password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<AccountIdentity>,
}

pub async fn verify_code(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, ConnectorError> {
    let usecase = VerifyCodeUseCase {
        sessions: state.sessions.clone(),
        sink: state.sink.clone(),
        discovery: state.discovery.clone(),
    };
    let out = state
        .bridge
        .run(async move {
            usecase
                .execute(VerifyCodeInput {
                    session_id,
                    code: body.code,
                })
                .await
        })
        .await?;
    Ok(Json(match out {
        VerifyCodeOutput::Authenticated { identity } => VerifyCodeResponse {
            authenticated: true,
            needs_password: false,
            identity: Some(identity),
        },
        VerifyCodeOutput::PasswordRequired { .. } => VerifyCodeResponse {
            authenticated: false,
            needs_password: true,
            identity: None,
        },
    }))
}

// ── POST /sessions/{session_id}/password ──────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyPasswordRequest {
    pub password: String,
}

#[derive(Serialize)]
pub struct VerifyPasswordResponse {
    pub authenticated: bool,
    pub identity: AccountIdentity,
}

pub async fn verify_password(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(body): Json<VerifyPasswordRequest>,
) -> Result<Json<VerifyPasswordResponse>, ConnectorError> {
    let usecase = VerifyPasswordUseCase {
        sessions: state.sessions.clone(),
        sink: state.sink.clone(),
        discovery: state.discovery.clone(),
    };
    let out = state
        .bridge
        .run(async move {
            usecase
                .execute(VerifyPasswordInput {
                    session_id,
                    password: body.password,
                })
                .await
        })
        .await?;
    Ok(Json(VerifyPasswordResponse {
        authenticated: true,
        identity: out.identity,
    }))
}
