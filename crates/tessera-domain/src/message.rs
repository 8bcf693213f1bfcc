//! Messages read back from an authenticated account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a message was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    /// The network's service-notification account (login codes arrive here).
    SystemNotices,
    /// The account's own saved-message history.
    OwnHistory,
}

impl MessageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemNotices => "system_notices",
            Self::OwnHistory => "own_history",
        }
    }
}

/// One inbound message, newest-first as returned by the remote client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub text: String,
    pub date: DateTime<Utc>,
}
