//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PUBLIC_ENV_PREFIX, DEFAULT_REFRESH_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_USER_AGENT,
};

/// How the service locator picks environment variables in the server context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Browser reads only public keys, server reads only private keys.
    #[default]
    Strict,
    /// Server prefers the private key and falls back to the public one.
    ServerFallback,
}

/// Configuration for the backend-access clients
///
/// Every field has a default, so partial files and partial environments are
/// both valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout applied to every outgoing request, in milliseconds
    pub request_timeout_ms: u64,
    /// Upper bound on a single session refresh call, in milliseconds
    pub refresh_timeout_ms: u64,
    pub user_agent: String,
    /// Prefix of the browser-visible service URL variables
    pub public_prefix: String,
    pub resolution: ResolutionMode,
    /// Where the browser-context access token is persisted. `None` keeps the
    /// token in memory only.
    pub credentials_path: Option<PathBuf>,
}

impl ClientConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub const fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            refresh_timeout_ms: DEFAULT_REFRESH_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            public_prefix: DEFAULT_PUBLIC_ENV_PREFIX.to_string(),
            resolution: ResolutionMode::Strict,
            credentials_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "request_timeout_ms": 500, "resolution": "server_fallback" }"#;
        let config: ClientConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.request_timeout(), Duration::from_millis(500));
        assert_eq!(config.refresh_timeout_ms, DEFAULT_REFRESH_TIMEOUT_MS);
        assert_eq!(config.resolution, ResolutionMode::ServerFallback);
        assert_eq!(config.public_prefix, "NEXT_PUBLIC");
        assert!(config.credentials_path.is_none());
    }
}
