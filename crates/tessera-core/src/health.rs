use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;

/// Liveness probe.
async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe. Services with external dependencies should replace this
/// route with their own check.
async fn readyz() -> StatusCode {
    StatusCode::OK
}

/// Router fragment exposing `GET /healthz` and `GET /readyz`. Merge into the
/// service router before `with_state`.
pub fn health_routes<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
