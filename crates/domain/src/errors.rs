//! Error types used throughout the toolkit

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for MarketHub backend access
///
/// Every failure surfaces to the caller as one of these variants; nothing in
/// the toolkit logs an error and carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum MarketHubError {
    /// A required configuration value (usually an environment variable) is
    /// missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An upstream endpoint answered with a non-success status.
    ///
    /// Displays as the bare message so it can be shown to users verbatim.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// Transport failure (DNS, refused connection, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// A success response carried a body that does not match the expected
    /// shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Persisting or removing the access token failed.
    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketHubError {
    /// Build a request error from a status code and message.
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request { status, message: message.into() }
    }

    /// HTTP status carried by the error, if it came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` when the upstream rejected the caller's session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }

    /// `true` for failures worth retrying at a higher layer.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Request { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Result type alias for MarketHub operations
pub type Result<T> = std::result::Result<T, MarketHubError>;
