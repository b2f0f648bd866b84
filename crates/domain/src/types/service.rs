//! Logical backend services and execution contexts

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::SERVICE_URL_ENV_SUFFIX;
use crate::errors::MarketHubError;

/// A logical backend the storefront talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceName {
    Auth,
    Catalog,
    Commerce,
    Payment,
}

impl ServiceName {
    pub const ALL: [Self; 4] = [Self::Auth, Self::Catalog, Self::Commerce, Self::Payment];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Catalog => "catalog",
            Self::Commerce => "commerce",
            Self::Payment => "payment",
        }
    }

    /// Server-only variable holding the base URL, e.g. `AUTH_API_URL`.
    #[must_use]
    pub fn private_env_key(self) -> String {
        format!("{}{SERVICE_URL_ENV_SUFFIX}", self.as_str().to_ascii_uppercase())
    }

    /// Browser-visible variable holding the base URL, e.g.
    /// `NEXT_PUBLIC_AUTH_API_URL` for the prefix `NEXT_PUBLIC`.
    #[must_use]
    pub fn public_env_key(self, prefix: &str) -> String {
        format!("{prefix}_{}", self.private_env_key())
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceName {
    type Err = MarketHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MarketHubError::InvalidInput(format!("unknown service name: {s}")))
    }
}

/// Where the toolkit is running.
///
/// Chosen once at startup and injected into the components that behave
/// differently per context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionContext {
    /// A user-facing client that owns a persistent token store.
    Browser,
    /// A server rendering pages on behalf of a user; it has no token store and
    /// forwards the caller's cookies instead.
    Server,
}

impl ExecutionContext {
    #[must_use]
    pub const fn is_browser(self) -> bool {
        matches!(self, Self::Browser)
    }

    #[must_use]
    pub const fn is_server(self) -> bool {
        matches!(self, Self::Server)
    }
}
