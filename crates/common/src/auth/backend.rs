//! Storage backends for credentials

use std::collections::HashMap;

use markethub_domain::MarketHubError;
use parking_lot::RwLock;
use thiserror::Error;

/// Errors raised by credential backends
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential file is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("keychain access failed: {0}")]
    Keychain(String),

    #[error("access token is empty")]
    EmptyToken,
}

impl From<CredentialError> for MarketHubError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::EmptyToken => Self::InvalidInput(err.to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Key/value storage for secrets.
///
/// Implementations must give read-your-writes semantics within a process.
/// Removing a missing key is not an error.
pub trait CredentialBackend: Send + Sync {
    /// Read the value stored under `key`, `None` when absent.
    ///
    /// # Errors
    /// Returns an error if the underlying storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, CredentialError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the value cannot be persisted.
    fn write(&self, key: &str, value: &str) -> Result<(), CredentialError>;

    /// Delete the value stored under `key` (idempotent).
    ///
    /// # Errors
    /// Returns an error if the underlying storage cannot be updated.
    fn remove(&self, key: &str) -> Result<(), CredentialError>;
}

/// Backend that keeps credentials for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        self.entries.write().remove(key);
        Ok(())
    }
}
