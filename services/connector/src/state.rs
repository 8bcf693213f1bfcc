use std::sync::Arc;

use crate::bridge::ExecutionBridge;
use crate::discovery::registry::DiscoveryRegistry;
use crate::domain::ports::{ExportSink, RemoteAccountConnector};
use crate::session::PendingSessionStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<dyn RemoteAccountConnector>,
    pub sink: Arc<dyn ExportSink>,
    pub sessions: Arc<PendingSessionStore>,
    pub discovery: Arc<DiscoveryRegistry>,
    pub bridge: Arc<ExecutionBridge>,
}
