use std::sync::Arc;

use tessera_domain::id::SessionId;
use tessera_domain::identity::AccountIdentity;

use crate::discovery::registry::DiscoveryRegistry;
use crate::domain::ports::ExportSink;
use crate::domain::types::SessionState;
use crate::error::ConnectorError;
use crate::session::PendingSessionStore;
use crate::usecase::complete_sign_in;

pub struct VerifyPasswordInput {
    pub session_id: SessionId,
    pub password: String,
}

#[derive(Debug)]
pub struct VerifyPasswordOutput {
    pub identity: AccountIdentity,
}

pub struct VerifyPasswordUseCase {
    pub sessions: Arc<PendingSessionStore>,
    pub sink: Arc<dyn ExportSink>,
    pub discovery: Arc<DiscoveryRegistry>,
}

impl VerifyPasswordUseCase {
    pub async fn execute(
        &self,
        input: VerifyPasswordInput,
    ) -> Result<VerifyPasswordOutput, ConnectorError> {
        self.sessions.sweep_expired().await;

        let session = self
            .sessions
            .claim(&input.session_id)
            .ok_or(ConnectorError::SessionNotFound)?;

        // Guards against replay on attempts that never asked for 2FA.
        if session.state != SessionState::AwaitingPassword {
            self.sessions.restore(session);
            return Err(ConnectorError::SessionNotFound);
        }

        let outcome = session.client.sign_in_with_password(&input.password).await;
        match outcome {
            Ok(identity) => {
                let identity =
                    complete_sign_in(session.client, identity, &self.sink, &self.discovery).await?;
                Ok(VerifyPasswordOutput { identity })
            }
            // A failed password terminates the attempt outright: no retry
            // slot is kept against the same challenge (anti-bruteforce).
            Err(err) => {
                session.client.disconnect().await;
                Err(err)
            }
        }
    }
}
