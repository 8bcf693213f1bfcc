pub mod request_code;
pub mod search;
pub mod verify_code;
pub mod verify_password;

use std::sync::Arc;

use chrono::Utc;

use tessera_domain::identity::AccountIdentity;

use crate::discovery::registry::DiscoveryRegistry;
use crate::domain::ports::{ExportSink, RemoteAccountClient};
use crate::domain::types::SessionExport;
use crate::error::ConnectorError;

/// Shared tail of both sign-in paths: export the session credential while
/// the connection is still live, persist it, then hand the client to a new
/// discovery job. Any failure before the hand-off disconnects the client.
pub(crate) async fn complete_sign_in(
    client: Box<dyn RemoteAccountClient>,
    identity: AccountIdentity,
    sink: &Arc<dyn ExportSink>,
    discovery: &Arc<DiscoveryRegistry>,
) -> Result<AccountIdentity, ConnectorError> {
    let exported = client.export_session().await;
    let credential = match exported {
        Ok(credential) => credential,
        Err(err) => {
            client.disconnect().await;
            return Err(err);
        }
    };
    let record = SessionExport {
        account: identity.clone(),
        credential,
        exported_at: Utc::now(),
    };
    if let Err(err) = sink.store(&record).await {
        client.disconnect().await;
        return Err(err);
    }
    tracing::info!(account_id = %identity.user_id, "account authenticated, session exported");
    discovery.start(identity.user_id, client, Utc::now());
    Ok(identity)
}
