//! Domain types and models
//!
//! Wire types mirror the JSON the MarketHub backends emit. Monetary amounts
//! stay decimal strings (the services serialize `Decimal`), and timestamps are
//! kept as the strings the services send.

pub mod auth;
pub mod catalog;
pub mod commerce;
pub mod pagination;
pub mod payment;
pub mod service;

pub use auth::{LoginRequest, RegisterRequest, TokenResponse, UserOut};
pub use catalog::{CatalogCategory, CatalogImage, CatalogProduct, CatalogVariant};
pub use commerce::{
    AddCartItem, Cart, CartItem, Checkout, CreateCheckout, Order, OrderItem, UpdateCartItem,
};
pub use pagination::{Listing, Page};
pub use payment::{CreatePayment, PaymentResponse, PaymentView};
pub use service::{ExecutionContext, ServiceName};

/// Serde helpers shared by the wire types.
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Accept a decimal amount as either a JSON string or a JSON number.
    pub fn amount<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected decimal string or number, got {other}"
            ))),
        }
    }
}
