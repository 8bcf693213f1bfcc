use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use tracing::warn;

use tessera_domain::id::SessionId;

use crate::domain::types::PendingSession;

/// In-memory registry of in-flight login attempts.
///
/// Entries are claimed (removed) for the duration of an operation and
/// restored only when the attempt stays alive, so overlapping calls for the
/// same session serialize on ownership instead of racing on a shared client.
/// The mutex is never held across an await.
#[derive(Default)]
pub struct PendingSessionStore {
    entries: Mutex<HashMap<SessionId, PendingSession>>,
}

impl PendingSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: PendingSession) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(session.id, session);
    }

    /// Take exclusive ownership of a session for the duration of one
    /// operation. Expired entries are never handed out; they stay behind for
    /// [`Self::sweep_expired`] to disconnect.
    pub fn claim(&self, id: &SessionId) -> Option<PendingSession> {
        let mut entries = self.entries.lock().unwrap();
        if entries.get(id).is_some_and(|s| s.is_expired(Utc::now())) {
            return None;
        }
        entries.remove(id)
    }

    /// Put a claimed session back after a non-terminal outcome.
    pub fn restore(&self, session: PendingSession) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(session.id, session);
    }

    /// Purge entries older than the TTL and release their clients.
    ///
    /// Lazy, pull-based expiry: invoked opportunistically before verify
    /// operations rather than from a timer. Disconnects happen outside the
    /// lock and are best-effort.
    pub async fn sweep_expired(&self) {
        let now = Utc::now();
        let stale: Vec<PendingSession> = {
            let mut entries = self.entries.lock().unwrap();
            let ids: Vec<SessionId> = entries
                .values()
                .filter(|s| s.is_expired(now))
                .map(|s| s.id)
                .collect();
            ids.iter().filter_map(|id| entries.remove(id)).collect()
        };
        for session in stale {
            warn!(session_id = %session.id, phone = %session.phone, "purging expired login attempt");
            session.client.disconnect().await;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
