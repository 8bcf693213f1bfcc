use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use tessera_core::health::health_routes;
use tessera_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    discovery::{discovery_status, search_now},
    session::{request_code, verify_code, verify_password},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .merge(health_routes())
        // Login handshake
        .route("/sessions", post(request_code))
        .route("/sessions/{session_id}/code", post(verify_code))
        .route("/sessions/{session_id}/password", post(verify_password))
        // Code discovery
        .route("/accounts/{account_id}/discovery", get(discovery_status))
        .route("/discovery/searches", post(search_now))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
