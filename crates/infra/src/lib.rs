//! # MarketHub Infrastructure
//!
//! Everything in MarketHub that performs I/O.
//!
//! This crate contains:
//! - Service discovery and configuration loading
//! - The HTTP, JSON and pagination layers
//! - Session refresh with single-flight de-duplication
//! - Typed clients for the auth, catalog, commerce and payment services
//!
//! ## Architecture
//! - Depends on `markethub-domain` for types and errors
//! - Depends on `markethub-common` for credential storage and coordination
//! - Third-party errors are mapped to `MarketHubError` in [`errors`]

pub mod api;
pub mod config;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::{
    AuthApi, CatalogApi, CheckoutFlow, CheckoutReceipt, CheckoutRequest, CommerceApi, MarketHub,
    PaymentApi, RequestContext,
};
pub use config::{ServiceLocator, ServiceUrls};
pub use errors::InfraError;
pub use http::{HttpClient, JsonClient, RequestOptions, SessionClient, SessionRefresher};
