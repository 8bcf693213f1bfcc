use std::sync::Arc;

use chrono::{Duration, Utc};

use tessera_domain::identity::ExportedCredential;
use tessera_domain::message::MessageSource;

use crate::discovery::extract::extract_code;
use crate::domain::ports::RemoteAccountConnector;
use crate::domain::types::{DISCOVERY_FETCH_LIMIT, SEARCH_LOOKBACK_SECS};
use crate::error::ConnectorError;

pub struct SearchNowInput {
    pub credential: ExportedCredential,
}

#[derive(Debug)]
pub struct SearchNowOutput {
    pub found: bool,
    pub code: Option<String>,
}

/// One-shot search over an already-exported credential: resume the session,
/// scan both message sources once with a fixed lookback window, disconnect.
pub struct SearchNowUseCase {
    pub connector: Arc<dyn RemoteAccountConnector>,
}

impl SearchNowUseCase {
    pub async fn execute(&self, input: SearchNowInput) -> Result<SearchNowOutput, ConnectorError> {
        let client = self.connector.resume(&input.credential).await?;
        let cutoff = Utc::now() - Duration::seconds(SEARCH_LOOKBACK_SECS);

        let mut found: Option<String> = None;
        'sources: for source in [MessageSource::SystemNotices, MessageSource::OwnHistory] {
            let messages = match client.read_recent_messages(source, DISCOVERY_FETCH_LIMIT).await {
                Ok(messages) => messages,
                Err(err) => {
                    client.disconnect().await;
                    return Err(err);
                }
            };
            for message in &messages {
                if message.date < cutoff {
                    continue;
                }
                if let Some(hit) = extract_code(&message.text) {
                    found = Some(hit.code);
                    break 'sources;
                }
            }
        }

        client.disconnect().await;
        Ok(SearchNowOutput {
            found: found.is_some(),
            code: found,
        })
    }
}
