use async_trait::async_trait;

use tessera_domain::identity::{AccountIdentity, ExportedCredential};
use tessera_domain::message::{InboundMessage, MessageSource};

use crate::domain::types::{ChallengeHandle, SessionExport};
use crate::error::ConnectorError;

/// Outcome of a code sign-in: either the account is fully authenticated or
/// the network demands the account's secondary (2FA) password next.
#[derive(Debug, Clone)]
pub enum SignInOutcome {
    Authenticated(AccountIdentity),
    PasswordRequired,
}

/// Factory for remote-network client connections.
///
/// Implementations are injected at startup; everything above this trait is
/// transport-agnostic. Ports are trait objects because clients are chosen at
/// runtime and move into spawned workers.
#[async_trait]
pub trait RemoteAccountConnector: Send + Sync {
    /// Open a fresh, unauthenticated connection.
    async fn connect(&self) -> Result<Box<dyn RemoteAccountClient>, ConnectorError>;

    /// Re-establish an authenticated connection from an exported credential.
    async fn resume(
        &self,
        credential: &ExportedCredential,
    ) -> Result<Box<dyn RemoteAccountClient>, ConnectorError>;
}

/// One live connection to the remote messaging network.
///
/// All failures arrive already translated into the [`ConnectorError`]
/// taxonomy; implementations own that mapping.
#[async_trait]
pub trait RemoteAccountClient: Send + Sync {
    /// Ask the network to deliver a one-time login code to `phone`.
    async fn request_code(&self, phone: &str) -> Result<ChallengeHandle, ConnectorError>;

    /// Complete sign-in with the delivered code.
    async fn sign_in_with_code(
        &self,
        challenge: &ChallengeHandle,
        code: &str,
    ) -> Result<SignInOutcome, ConnectorError>;

    /// Complete sign-in with the account's secondary password. Only valid
    /// after `sign_in_with_code` returned [`SignInOutcome::PasswordRequired`].
    async fn sign_in_with_password(
        &self,
        password: &str,
    ) -> Result<AccountIdentity, ConnectorError>;

    /// Export the session credential. Only valid while connected and
    /// authenticated; export after disconnect is invalid.
    async fn export_session(&self) -> Result<ExportedCredential, ConnectorError>;

    /// Fetch the most recent messages from one source, newest first.
    async fn read_recent_messages(
        &self,
        source: MessageSource,
        limit: usize,
    ) -> Result<Vec<InboundMessage>, ConnectorError>;

    /// Tear the connection down. Best-effort: errors are swallowed by the
    /// implementation, so every cleanup path can call this unconditionally.
    async fn disconnect(&self);
}

/// Persists one record per authenticated account. The storage representation
/// (flat files, relational rows, …) is the adapter's concern.
#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn store(&self, record: &SessionExport) -> Result<(), ConnectorError>;
}
