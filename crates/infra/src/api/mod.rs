//! Typed clients for the MarketHub backends
//!
//! Each client maps one backend service onto typed calls:
//!
//! - [`AuthApi`]: register, login, logout, current user
//! - [`CatalogApi`]: categories and products (public, unauthenticated)
//! - [`CommerceApi`]: carts, checkouts and orders
//! - [`PaymentApi`]: payment creation and lookup
//! - [`CheckoutFlow`]: checkout followed by payment under one idempotency key
//!
//! [`MarketHub`] wires them to one HTTP client, one caller identity and one
//! session-refresh registry.
//!
//! # Example
//!
//! ```no_run
//! use markethub_domain::ExecutionContext;
//! use markethub_infra::api::{CheckoutRequest, MarketHub};
//!
//! # async fn run() -> markethub_domain::Result<()> {
//! let hub = MarketHub::from_env(ExecutionContext::Browser)?;
//! hub.auth().login("buyer@example.com", "secret").await?;
//!
//! let cart = hub.commerce().cart().await?;
//! let receipt = hub
//!     .checkout("https://shop.example.com")?
//!     .run(&CheckoutRequest::new(cart.id, "199000.00", "VND"))
//!     .await?;
//! println!("pay at {:?}", receipt.redirect_url());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod commerce;
pub mod context;
pub mod hub;
pub mod payment;

pub use auth::AuthApi;
pub use catalog::{CatalogApi, CategoryWithProducts};
pub use checkout::{CheckoutFlow, CheckoutReceipt, CheckoutRequest};
pub use commerce::CommerceApi;
pub use context::RequestContext;
#[cfg(feature = "keychain")]
pub use hub::keychain_credentials;
pub use hub::MarketHub;
pub use payment::PaymentApi;
