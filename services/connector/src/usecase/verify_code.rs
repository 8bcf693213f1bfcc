use std::sync::Arc;

use tessera_domain::id::SessionId;
use tessera_domain::identity::AccountIdentity;

use crate::discovery::registry::DiscoveryRegistry;
use crate::domain::ports::{ExportSink, SignInOutcome};
use crate::domain::types::SessionState;
use crate::error::ConnectorError;
use crate::session::PendingSessionStore;
use crate::usecase::complete_sign_in;

pub struct VerifyCodeInput {
    pub session_id: SessionId,
    pub code: String,
}

/// Tagged outcome of a code verification. There is no loosely-typed
/// "maybe a password is needed" dictionary to inspect.
#[derive(Debug)]
pub enum VerifyCodeOutput {
    Authenticated { identity: AccountIdentity },
    PasswordRequired { session_id: SessionId },
}

pub struct VerifyCodeUseCase {
    pub sessions: Arc<PendingSessionStore>,
    pub sink: Arc<dyn ExportSink>,
    pub discovery: Arc<DiscoveryRegistry>,
}

impl VerifyCodeUseCase {
    pub async fn execute(
        &self,
        input: VerifyCodeInput,
    ) -> Result<VerifyCodeOutput, ConnectorError> {
        self.sessions.sweep_expired().await;

        // Claiming removes the entry: one caller at a time owns the client.
        let mut session = self
            .sessions
            .claim(&input.session_id)
            .ok_or(ConnectorError::SessionNotFound)?;

        if session.state != SessionState::AwaitingCode {
            self.sessions.restore(session);
            return Err(ConnectorError::SessionNotFound);
        }

        let outcome = session
            .client
            .sign_in_with_code(&session.challenge, &input.code)
            .await;
        match outcome {
            Ok(SignInOutcome::Authenticated(identity)) => {
                let identity =
                    complete_sign_in(session.client, identity, &self.sink, &self.discovery).await?;
                Ok(VerifyCodeOutput::Authenticated { identity })
            }
            Ok(SignInOutcome::PasswordRequired) => {
                let session_id = session.id;
                session.state = SessionState::AwaitingPassword;
                self.sessions.restore(session);
                Ok(VerifyCodeOutput::PasswordRequired { session_id })
            }
            // A rejected code leaves the attempt alive: the caller may retry
            // against the same challenge.
            Err(err @ ConnectorError::InvalidCode) => {
                self.sessions.restore(session);
                Err(err)
            }
            // Everything else is terminal for this attempt: expired code,
            // rate limit, transport failure. Release the connection and
            // drop the entry; a fresh RequestCode is required.
            Err(err) => {
                session.client.disconnect().await;
                Err(err)
            }
        }
    }
}
