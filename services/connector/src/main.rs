use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::info;

use tessera_connector::bridge::ExecutionBridge;
use tessera_connector::config::ConnectorConfig;
use tessera_connector::discovery::registry::DiscoveryRegistry;
use tessera_connector::infra::gateway::GatewayConnector;
use tessera_connector::infra::sink::JsonFileSink;
use tessera_connector::router::build_router;
use tessera_connector::session::PendingSessionStore;
use tessera_connector::state::AppState;

#[tokio::main]
async fn main() {
    tessera_core::tracing::init_tracing();

    let config = ConnectorConfig::from_env();

    let http = reqwest::Client::new();
    let connector = GatewayConnector::new(http, config.gateway_url.clone());

    let sink = JsonFileSink::new(config.export_dir.clone())
        .await
        .expect("failed to prepare export dir");

    // Discovery workers run on this (the service) runtime; the bridge gets
    // its own dedicated context.
    let discovery = Arc::new(DiscoveryRegistry::new(
        Handle::current(),
        Duration::from_secs(config.discovery_budget_secs),
        Duration::from_secs(config.discovery_poll_secs),
    ));
    let bridge = Arc::new(ExecutionBridge::new(Duration::from_secs(
        config.bridge_timeout_secs,
    )));

    let state = AppState {
        connector: Arc::new(connector),
        sink: Arc::new(sink),
        sessions: Arc::new(PendingSessionStore::new()),
        discovery,
        bridge,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("connector service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
