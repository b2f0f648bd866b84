//! Context-aware access-token store

use std::fmt;
use std::sync::Arc;

use markethub_domain::constants::ACCESS_TOKEN_KEY;
use markethub_domain::ExecutionContext;
use tracing::{debug, warn};

use super::backend::{CredentialBackend, CredentialError, MemoryBackend};

/// Holds the user's access token.
///
/// In the [`ExecutionContext::Server`] context the store is inert: reads
/// return `None` and writes are skipped without error, because a server
/// renders for many users and must never share one token between them.
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone)]
pub struct CredentialStore {
    context: ExecutionContext,
    backend: Arc<dyn CredentialBackend>,
    key: String,
}

impl CredentialStore {
    /// Create a store over an explicit backend.
    pub fn new(context: ExecutionContext, backend: Arc<dyn CredentialBackend>) -> Self {
        Self { context, backend, key: ACCESS_TOKEN_KEY.to_string() }
    }

    /// Create a store that keeps the token in memory.
    #[must_use]
    pub fn in_memory(context: ExecutionContext) -> Self {
        Self::new(context, Arc::new(MemoryBackend::new()))
    }

    /// Use a different storage key than the default `markethub_access_token`.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub const fn context(&self) -> ExecutionContext {
        self.context
    }

    /// Current token, if any.
    ///
    /// A backend read failure is logged and reported as "no token", so a
    /// broken store degrades to an anonymous session. An empty entry written
    /// by another tool also reads as "no token".
    #[must_use]
    pub fn get(&self) -> Option<String> {
        if self.context.is_server() {
            return None;
        }

        match self.backend.read(&self.key) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                warn!(error = %err, "Failed to read access token; treating session as anonymous");
                None
            }
        }
    }

    /// Persist a new token.
    ///
    /// # Errors
    /// - [`CredentialError::EmptyToken`] for an empty token, in every context
    /// - the backend's error when it cannot persist the token
    pub fn set(&self, token: &str) -> Result<(), CredentialError> {
        if token.is_empty() {
            return Err(CredentialError::EmptyToken);
        }
        if self.context.is_server() {
            debug!("Skipping token write outside the browser context");
            return Ok(());
        }

        self.backend.write(&self.key, token)?;
        debug!(has_token = true, "Access token stored");
        Ok(())
    }

    /// Remove the token. Clearing an empty store is a no-op.
    ///
    /// # Errors
    /// Returns an error if the backend cannot remove the token.
    pub fn clear(&self) -> Result<(), CredentialError> {
        if self.context.is_server() {
            return Ok(());
        }

        self.backend.remove(&self.key)?;
        debug!(has_token = false, "Access token cleared");
        Ok(())
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.get().is_some()
    }

    /// Value for the `Authorization` header, `None` when there is no token.
    #[must_use]
    pub fn auth_header(&self) -> Option<String> {
        self.get().map(|token| format!("Bearer {token}"))
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("context", &self.context)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FailingBackend;

    #[test]
    fn set_then_get_returns_the_token() {
        let store = CredentialStore::in_memory(ExecutionContext::Browser);
        store.set("tok-1").unwrap();

        assert_eq!(store.get().as_deref(), Some("tok-1"));
        assert!(store.has_token());
    }

    #[test]
    fn empty_token_is_rejected_and_previous_token_kept() {
        let store = CredentialStore::in_memory(ExecutionContext::Browser);
        store.set("tok-1").unwrap();

        let err = store.set("").unwrap_err();

        assert!(matches!(err, CredentialError::EmptyToken));
        assert_eq!(store.get().as_deref(), Some("tok-1"));
    }

    #[test]
    fn empty_token_is_rejected_on_a_fresh_store() {
        let store = CredentialStore::in_memory(ExecutionContext::Browser);

        assert!(store.set("").is_err());
        assert!(store.get().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let store = CredentialStore::in_memory(ExecutionContext::Browser);
        store.set("tok-1").unwrap();

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn auth_header_is_bearer_or_absent() {
        let store = CredentialStore::in_memory(ExecutionContext::Browser);
        assert!(store.auth_header().is_none());

        store.set("abc").unwrap();
        assert_eq!(store.auth_header().as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn server_context_is_inert() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write(ACCESS_TOKEN_KEY, "leaked").unwrap();

        let store = CredentialStore::new(ExecutionContext::Server, backend.clone());
        assert!(store.get().is_none());
        assert!(store.auth_header().is_none());

        store.set("ignored").unwrap();
        store.clear().unwrap();
        assert_eq!(backend.read(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("leaked"));
    }

    #[test]
    fn clones_share_the_backend() {
        let store = CredentialStore::in_memory(ExecutionContext::Browser);
        let clone = store.clone();

        store.set("shared").unwrap();
        assert_eq!(clone.get().as_deref(), Some("shared"));
    }

    #[test]
    fn custom_key_is_isolated() {
        let backend: Arc<dyn CredentialBackend> = Arc::new(MemoryBackend::new());
        let default = CredentialStore::new(ExecutionContext::Browser, backend.clone());
        let other = CredentialStore::new(ExecutionContext::Browser, backend).with_key("other");

        default.set("a").unwrap();
        assert!(other.get().is_none());
    }

    #[test]
    fn read_failures_degrade_to_no_token() {
        let store = CredentialStore::new(ExecutionContext::Browser, Arc::new(FailingBackend));

        assert!(store.get().is_none());
        assert!(store.set("x").is_err());
        assert!(store.clear().is_err());
    }

    #[test]
    fn debug_output_omits_token() {
        let store = CredentialStore::in_memory(ExecutionContext::Browser);
        store.set("very-secret").unwrap();
        assert!(!format!("{store:?}").contains("very-secret"));
    }
}
