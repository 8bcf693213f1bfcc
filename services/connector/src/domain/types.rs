use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tessera_domain::id::{AccountId, SessionId};
use tessera_domain::identity::{AccountIdentity, ExportedCredential};
use tessera_domain::message::MessageSource;

use crate::domain::ports::RemoteAccountClient;

/// Opaque token issued by the remote network after a code request; required
/// to complete sign-in against the same challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeHandle(pub String);

/// Where an in-flight login attempt stands.
///
/// Terminal outcomes (authenticated, failed, expired) are represented by
/// removing the entry from the store: an entry exists exactly as long as it
/// owns a live client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingCode,
    AwaitingPassword,
}

/// One in-flight login attempt. Owns the connected client; the challenge
/// handle is set at creation and never mutated.
pub struct PendingSession {
    pub id: SessionId,
    pub phone: String,
    pub challenge: ChallengeHandle,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub client: Box<dyn RemoteAccountClient>,
}

impl PendingSession {
    pub fn new(phone: &str, challenge: ChallengeHandle, client: Box<dyn RemoteAccountClient>) -> Self {
        Self {
            id: SessionId::generate(),
            phone: phone.to_owned(),
            challenge,
            state: SessionState::AwaitingCode,
            created_at: Utc::now(),
            client,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::seconds(SESSION_TTL_SECS)
    }
}

/// The record handed to the export sink once an account authenticates.
/// Must be persisted before the client connection is torn down; exporting
/// after disconnect is invalid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExport {
    pub account: AccountIdentity,
    pub credential: ExportedCredential,
    pub exported_at: DateTime<Utc>,
}

/// Terminal and in-flight states of a discovery job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStatus {
    Searching,
    Found,
    NotFound,
}

/// Queryable state of one account's discovery job. `job_id` changes whenever
/// a job is replaced; workers may only write through a matching id.
#[derive(Debug, Clone)]
pub struct DiscoveryRecord {
    pub job_id: Uuid,
    pub account_id: AccountId,
    pub status: DiscoveryStatus,
    pub attempts: u32,
    pub search_started_at: DateTime<Utc>,
    pub code: Option<String>,
    pub found_at: Option<DateTime<Utc>>,
    pub source: Option<MessageSource>,
}

impl DiscoveryRecord {
    pub fn searching(job_id: Uuid, account_id: AccountId, started_at: DateTime<Utc>) -> Self {
        Self {
            job_id,
            account_id,
            status: DiscoveryStatus::Searching,
            attempts: 0,
            search_started_at: started_at,
            code: None,
            found_at: None,
            source: None,
        }
    }
}

/// Pending login attempts older than this are purged and their client
/// connections released.
pub const SESSION_TTL_SECS: i64 = 300;

/// Default wall-clock budget for one discovery job.
pub const DISCOVERY_BUDGET_SECS: u64 = 300;

/// Default pause between discovery polling rounds.
pub const DISCOVERY_POLL_SECS: u64 = 5;

/// How many recent messages one polling round fetches per source.
pub const DISCOVERY_FETCH_LIMIT: usize = 25;

/// Ceiling on how long a caller blocks on a bridged remote operation.
pub const BRIDGE_TIMEOUT_SECS: u64 = 30;

/// Recency window for one-shot searches over an existing credential.
pub const SEARCH_LOOKBACK_SECS: i64 = 300;
