//! Keychain-backed credential storage
//!
//! Thin wrapper over the platform keychain (macOS Keychain Access, Windows
//! Credential Manager, Linux Secret Service) for hosts that should not keep
//! the access token in a plain file.

use keyring::Entry;
use tracing::debug;

use super::backend::{CredentialBackend, CredentialError};

/// Credential backend storing each key as a keychain entry under one service
/// name.
#[derive(Debug, Clone)]
pub struct KeychainBackend {
    service_name: String,
}

impl KeychainBackend {
    /// Create a backend for a keychain service (e.g. `"MarketHub"`).
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    fn entry(&self, key: &str) -> Result<Entry, CredentialError> {
        Entry::new(&self.service_name, key).map_err(|e| {
            CredentialError::Keychain(format!("Failed to open keychain entry {key}: {e}"))
        })
    }
}

impl CredentialBackend for KeychainBackend {
    fn read(&self, key: &str) -> Result<Option<String>, CredentialError> {
        debug!(service = %self.service_name, key = %key, "Reading secret from keychain");

        match self.entry(key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialError::Keychain(format!(
                "Failed to retrieve secret for {key}: {e}"
            ))),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        debug!(service = %self.service_name, key = %key, "Storing secret in keychain");

        self.entry(key)?.set_password(value).map_err(|e| {
            CredentialError::Keychain(format!("Failed to store secret for {key}: {e}"))
        })
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        debug!(service = %self.service_name, key = %key, "Deleting secret from keychain");

        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CredentialError::Keychain(format!(
                "Failed to delete secret for {key}: {e}"
            ))),
        }
    }
}
