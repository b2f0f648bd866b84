//! Runtime building blocks shared across MarketHub crates.
//!
//! Nothing in this crate talks HTTP; it provides the pieces the HTTP layer
//! is assembled from.
//!
//! # Modules
//!
//! - [`auth`]: the access-token credential store and its storage backends
//! - [`sync`]: single-flight coordination for de-duplicated async work
//! - `testing`: helpers for test suites (`test-utils` feature)
//!
//! # Feature Tiers
//!
//! - default: in-memory and file-backed credential storage
//! - `platform`: OS keychain storage via `keyring`
//! - `test-utils`: tracing setup and failure-injecting backends for tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod sync;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types
// ------------------------
pub use auth::{CredentialBackend, CredentialError, CredentialStore, FileBackend, MemoryBackend};
#[cfg(feature = "platform")]
pub use auth::KeychainBackend;
pub use sync::SingleFlight;
