use std::sync::Arc;

use tessera_domain::id::SessionId;

use crate::domain::ports::RemoteAccountConnector;
use crate::domain::types::PendingSession;
use crate::error::ConnectorError;
use crate::session::PendingSessionStore;

pub struct RequestCodeInput {
    pub phone: String,
}

#[derive(Debug)]
pub struct RequestCodeOutput {
    pub session_id: SessionId,
}

/// Start a login attempt: connect, ask the network to deliver a one-time
/// code, and park the live connection in the pending-session store.
pub struct RequestCodeUseCase {
    pub connector: Arc<dyn RemoteAccountConnector>,
    pub sessions: Arc<PendingSessionStore>,
}

impl RequestCodeUseCase {
    pub async fn execute(
        &self,
        input: RequestCodeInput,
    ) -> Result<RequestCodeOutput, ConnectorError> {
        let phone = input.phone.trim();
        if phone.is_empty() {
            return Err(ConnectorError::InvalidPhoneNumber);
        }

        let client = self.connector.connect().await?;

        // Any failure past this point owns a live connection; release it
        // before surfacing the error.
        let requested = client.request_code(phone).await;
        let challenge = match requested {
            Ok(challenge) => challenge,
            Err(err) => {
                client.disconnect().await;
                return Err(err);
            }
        };

        let session = PendingSession::new(phone, challenge, client);
        let session_id = session.id;
        self.sessions.insert(session);
        tracing::info!(session_id = %session_id, "login code requested");

        Ok(RequestCodeOutput { session_id })
    }
}
