use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Connector service error variants.
///
/// Every remote-client failure is translated into one of these at the port
/// boundary; callers never see raw transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("invalid phone number")]
    InvalidPhoneNumber,
    #[error("invalid login code")]
    InvalidCode,
    #[error("login code expired, request a new one")]
    CodeExpired,
    #[error("invalid password")]
    InvalidPassword,
    #[error("session not found")]
    SessionNotFound,
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),
    #[error("code discovery not started for this account")]
    DiscoveryNotStarted,
    #[error("remote network unavailable")]
    RemoteUnavailable(#[source] anyhow::Error),
    #[error("operation timed out")]
    Timeout,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ConnectorError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPhoneNumber => "INVALID_PHONE_NUMBER",
            Self::InvalidCode => "INVALID_CODE",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::DiscoveryNotStarted => "DISCOVERY_NOT_STARTED",
            Self::RemoteUnavailable(_) => "REMOTE_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ConnectorError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidPhoneNumber => StatusCode::BAD_REQUEST,
            Self::InvalidCode | Self::InvalidPassword => StatusCode::UNAUTHORIZED,
            Self::SessionNotFound | Self::DiscoveryNotStarted => StatusCode::NOT_FOUND,
            Self::CodeExpired => StatusCode::GONE,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::RemoteUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 5xx only — the router's TraceLayer already records
        // method/uri/status for all requests. 4xx are expected client errors;
        // logging them here would be noise. Internal and upstream errors need
        // their source chains logged so the root cause is traceable.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
            }
            Self::RemoteUnavailable(e) => {
                tracing::warn!(error = %e, kind = "REMOTE_UNAVAILABLE", "remote unavailable");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        let mut response = (status, axum::Json(body)).into_response();
        if let Self::RateLimited(secs) = self {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
