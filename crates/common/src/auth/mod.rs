//! Access-token credential storage
//!
//! The storefront keeps a single opaque access token per user. This module
//! persists it and turns it into an `Authorization` header.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ CredentialStore  │  context-aware facade (inert in the server context)
//! └────────┬─────────┘
//!          │
//!          └──► CredentialBackend (trait)
//!                 ├──► MemoryBackend    (process lifetime)
//!                 ├──► FileBackend      (JSON file, survives restarts)
//!                 └──► KeychainBackend  (OS keychain, `platform` feature)
//! ```
//!
//! # Usage Example
//!
//! ```
//! use markethub_common::auth::CredentialStore;
//! use markethub_domain::ExecutionContext;
//!
//! let store = CredentialStore::in_memory(ExecutionContext::Browser);
//! store.set("abc123")?;
//! assert_eq!(store.auth_header().as_deref(), Some("Bearer abc123"));
//!
//! store.clear()?;
//! assert!(store.get().is_none());
//! # Ok::<(), markethub_common::auth::CredentialError>(())
//! ```

pub mod backend;
pub mod file;
#[cfg(feature = "platform")]
pub mod keychain;
pub mod store;

pub use backend::{CredentialBackend, CredentialError, MemoryBackend};
pub use file::FileBackend;
#[cfg(feature = "platform")]
pub use keychain::KeychainBackend;
pub use store::CredentialStore;
