//! Payment service wire types

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/payments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePayment {
    /// Whole currency units.
    pub amount: i64,
    pub currency: String,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub payment_id: i64,
    #[serde(default)]
    pub provider_ref: Option<String>,
    pub status: String,
    #[serde(default)]
    pub qr_url: Option<String>,
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Body of `GET /v1/payments/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentView {
    pub payment_id: i64,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub order_id: String,
    #[serde(default)]
    pub provider_ref: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl PaymentView {
    /// `true` once the provider has confirmed the payment.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status == "paid"
    }
}
