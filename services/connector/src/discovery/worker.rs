use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use tessera_domain::id::AccountId;
use tessera_domain::message::MessageSource;

use crate::discovery::extract::extract_code;
use crate::discovery::registry::DiscoveryRegistry;
use crate::domain::ports::RemoteAccountClient;
use crate::domain::types::DISCOVERY_FETCH_LIMIT;

/// Background polling loop that watches one authenticated account for a
/// freshly arrived login code.
///
/// Scans the network's service-notice feed and the account's own history
/// each round, extracting codes only from messages dated at or after
/// `search_started_at`; older messages would surface stale codes from
/// earlier logins. Terminates on the first hit, on budget exhaustion, or
/// when its cancellation token fires; the client is released on every exit
/// path.
pub struct CodeDiscoveryWorker {
    registry: Arc<DiscoveryRegistry>,
    account_id: AccountId,
    job_id: Uuid,
    client: Box<dyn RemoteAccountClient>,
    search_started_at: DateTime<Utc>,
    budget: Duration,
    poll_interval: Duration,
    cancel: CancellationToken,
}

struct FoundCode {
    code: String,
    source: MessageSource,
}

impl CodeDiscoveryWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        registry: Arc<DiscoveryRegistry>,
        account_id: AccountId,
        job_id: Uuid,
        client: Box<dyn RemoteAccountClient>,
        search_started_at: DateTime<Utc>,
        budget: Duration,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            registry,
            account_id,
            job_id,
            client,
            search_started_at,
            budget,
            poll_interval,
            cancel,
        }
    }

    pub async fn run(self) {
        let deadline = Instant::now() + self.budget;
        loop {
            if self.cancel.is_cancelled() {
                debug!(account_id = %self.account_id, "discovery job cancelled");
                break;
            }
            let attempts = self.registry.record_attempt(self.account_id, self.job_id);
            if attempts == 0 {
                // Superseded by a newer job; it owns the record now.
                break;
            }
            if let Some(found) = self.scan_once().await {
                if self
                    .registry
                    .finish_found(self.account_id, self.job_id, found.code, found.source)
                {
                    info!(
                        account_id = %self.account_id,
                        attempts,
                        source = found.source.as_str(),
                        "login code discovered"
                    );
                }
                break;
            }
            if Instant::now() + self.poll_interval >= deadline {
                if self.registry.finish_not_found(self.account_id, self.job_id) {
                    info!(
                        account_id = %self.account_id,
                        attempts,
                        "discovery budget exhausted without a code"
                    );
                }
                break;
            }
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!(account_id = %self.account_id, "discovery job cancelled during pause");
                    break;
                }
                _ = sleep(self.poll_interval) => {}
            }
        }
        self.client.disconnect().await;
    }

    /// One polling round over both message sources. Fetch failures on one
    /// source are logged and skipped; the loop carries on.
    async fn scan_once(&self) -> Option<FoundCode> {
        for source in [MessageSource::SystemNotices, MessageSource::OwnHistory] {
            let messages = match self
                .client
                .read_recent_messages(source, DISCOVERY_FETCH_LIMIT)
                .await
            {
                Ok(messages) => messages,
                Err(err) => {
                    warn!(
                        account_id = %self.account_id,
                        source = source.as_str(),
                        error = %err,
                        "message fetch failed, will retry next round"
                    );
                    continue;
                }
            };
            for message in &messages {
                if message.date < self.search_started_at {
                    continue;
                }
                if let Some(hit) = extract_code(&message.text) {
                    if !hit.confident {
                        debug!(
                            account_id = %self.account_id,
                            source = source.as_str(),
                            "numeric match without authorization keyword, accepting anyway"
                        );
                    }
                    return Some(FoundCode {
                        code: hit.code,
                        source,
                    });
                }
            }
        }
        None
    }
}
