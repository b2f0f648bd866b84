//! Testing utilities and helpers
//!
//! - [`init_test_tracing`]: route `tracing` output through the test harness
//! - [`FailingBackend`]: a credential backend whose every operation fails

// Test helpers are self-explanatory; skip the error/panic doc sections.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::sync::Once;

use crate::auth::{CredentialBackend, CredentialError};

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Honours `RUST_LOG`; safe to call from every test.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Credential backend that rejects every operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingBackend;

impl CredentialBackend for FailingBackend {
    fn read(&self, _key: &str) -> Result<Option<String>, CredentialError> {
        Err(CredentialError::Keychain("backend unavailable".into()))
    }

    fn write(&self, _key: &str, _value: &str) -> Result<(), CredentialError> {
        Err(CredentialError::Keychain("backend unavailable".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), CredentialError> {
        Err(CredentialError::Keychain("backend unavailable".into()))
    }
}
