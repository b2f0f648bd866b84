//! # MarketHub Domain
//!
//! Domain types shared by every MarketHub crate.
//!
//! This crate contains:
//! - The workspace error type and `Result` alias
//! - Service names and execution contexts used for service discovery
//! - Wire types for the auth, catalog, commerce and payment backends
//! - Client configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other MarketHub crates
//! - No I/O: pure data and conversions

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
