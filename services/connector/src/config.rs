use std::path::PathBuf;

use crate::domain::types::{BRIDGE_TIMEOUT_SECS, DISCOVERY_BUDGET_SECS, DISCOVERY_POLL_SECS};

/// Connector service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ConnectorConfig {
    /// Base URL of the MTProto gateway sidecar. Env var: `GATEWAY_URL`.
    pub gateway_url: String,
    /// Directory for exported session records (default `./exports`).
    pub export_dir: PathBuf,
    /// TCP port to listen on (default 3114). Env var: `CONNECTOR_PORT`.
    pub port: u16,
    /// Wall-clock budget for one discovery job, seconds.
    pub discovery_budget_secs: u64,
    /// Pause between discovery polling rounds, seconds.
    pub discovery_poll_secs: u64,
    /// Ceiling on bridged remote operations, seconds.
    pub bridge_timeout_secs: u64,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl ConnectorConfig {
    pub fn from_env() -> Self {
        Self {
            gateway_url: std::env::var("GATEWAY_URL").expect("GATEWAY_URL"),
            export_dir: env_or("EXPORT_DIR", PathBuf::from("./exports")),
            port: env_or("CONNECTOR_PORT", 3114),
            discovery_budget_secs: env_or("DISCOVERY_BUDGET_SECS", DISCOVERY_BUDGET_SECS),
            discovery_poll_secs: env_or("DISCOVERY_POLL_SECS", DISCOVERY_POLL_SECS),
            bridge_timeout_secs: env_or("BRIDGE_TIMEOUT_SECS", BRIDGE_TIMEOUT_SECS),
        }
    }
}
