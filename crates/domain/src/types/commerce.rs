//! Commerce service wire types (carts, checkouts, orders)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub sku: Option<String>,
    pub qty: u32,
    #[serde(deserialize_with = "super::de::amount")]
    pub unit_price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Distinct product ids in item order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if !ids.contains(&item.product_id) {
                ids.push(item.product_id);
            }
        }
        ids
    }

    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.qty).sum()
    }
}

/// Body of `POST /v1/carts/{id}/items`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddCartItem {
    pub product_id: i64,
    pub sku: Option<String>,
    pub qty: u32,
    pub unit_price: f64,
}

/// Body of `PATCH /v1/carts/{id}/items/{item}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateCartItem {
    pub qty: u32,
}

/// Body of `POST /v1/checkouts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateCheckout {
    pub cart_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    pub order_id: i64,
    #[serde(deserialize_with = "super::de::amount")]
    pub total_amount: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub sku: Option<String>,
    pub qty: u32,
    #[serde(deserialize_with = "super::de::amount")]
    pub unit_price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    #[serde(deserialize_with = "super::de::amount")]
    pub total_amount: String,
    pub currency: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}
