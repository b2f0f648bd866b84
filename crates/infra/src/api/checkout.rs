//! Checkout: create the order, then start its payment

use markethub_domain::{
    Checkout, CreateCheckout, CreatePayment, MarketHubError, PaymentResponse, Result,
};
use tracing::{info, instrument};
use url::Url;
use uuid::Uuid;

use super::commerce::CommerceApi;
use super::payment::PaymentApi;
use crate::errors::InfraError;

/// What the caller knows about the cart being paid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub cart_id: i64,
    /// Cart total as a decimal string, e.g. `"199000.00"`.
    pub total_amount: String,
    pub currency: String,
    pub promo_code: Option<String>,
}

impl CheckoutRequest {
    #[must_use]
    pub fn new(cart_id: i64, total_amount: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            cart_id,
            total_amount: total_amount.into(),
            currency: currency.into(),
            promo_code: None,
        }
    }

    #[must_use]
    pub fn with_promo_code(mut self, code: impl Into<String>) -> Self {
        self.promo_code = Some(code.into());
        self
    }
}

/// Outcome of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    /// Key sent with both calls; replaying it is safe.
    pub idempotency_key: String,
    pub checkout: Checkout,
    pub payment: PaymentResponse,
}

impl CheckoutReceipt {
    /// Where to send the buyer to complete the payment, if anywhere.
    #[must_use]
    pub fn redirect_url(&self) -> Option<&str> {
        self.payment.checkout_url.as_deref()
    }
}

/// Two sequential calls: checkout on the commerce service, then payment.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    commerce: CommerceApi,
    payment: PaymentApi,
    origin: Url,
}

impl CheckoutFlow {
    /// `origin` is the storefront's own absolute URL, used to build the
    /// payment's return URL.
    ///
    /// # Errors
    /// Returns `MarketHubError::InvalidInput` if `origin` is not an absolute
    /// URL.
    pub fn new(commerce: CommerceApi, payment: PaymentApi, origin: &str) -> Result<Self> {
        let origin = Url::parse(origin).map_err(InfraError::from)?;
        Ok(Self { commerce, payment, origin })
    }

    /// Page the buyer lands on after paying for `order_id`.
    ///
    /// # Errors
    /// Returns `MarketHubError::InvalidInput` if the origin cannot carry a
    /// path (e.g. `mailto:`).
    pub fn return_url(&self, order_id: i64) -> Result<String> {
        let url = self.origin.join(&format!("/orders/{order_id}")).map_err(InfraError::from)?;
        Ok(url.to_string())
    }

    /// Create the checkout and its payment under one idempotency key.
    ///
    /// # Errors
    /// - `MarketHubError::InvalidInput` for a total that is not a positive
    ///   number; nothing is sent
    /// - the checkout step's error; the payment step is then skipped
    /// - the payment step's error
    #[instrument(skip(self, request), fields(cart_id = request.cart_id))]
    pub async fn run(&self, request: &CheckoutRequest) -> Result<CheckoutReceipt> {
        let amount = payable_amount(&request.total_amount)?;
        let idempotency_key = Uuid::new_v4().to_string();

        let checkout_request =
            CreateCheckout { cart_id: request.cart_id, promo_code: request.promo_code.clone() };
        let checkout = self.commerce.create_checkout(&checkout_request, &idempotency_key).await?;

        let payment_request = CreatePayment {
            amount,
            currency: request.currency.clone(),
            order_id: checkout.order_id.to_string(),
            customer_id: None,
            return_url: Some(self.return_url(checkout.order_id)?),
        };
        let payment = self.payment.create_payment(&payment_request, &idempotency_key).await?;

        info!(order_id = checkout.order_id, payment_id = payment.payment_id, "Checkout completed");
        Ok(CheckoutReceipt { idempotency_key, checkout, payment })
    }
}

/// Parse a decimal total and round it to whole currency units.
#[allow(clippy::cast_possible_truncation)]
fn payable_amount(total: &str) -> Result<i64> {
    let value: f64 = total
        .trim()
        .parse()
        .map_err(|_| MarketHubError::InvalidInput(format!("Invalid cart total: {total}")))?;

    let rounded = value.round();
    if !value.is_finite() || rounded <= 0.0 || rounded >= i64::MAX as f64 {
        return Err(MarketHubError::InvalidInput(format!(
            "Cart total must be a positive amount, got {total}"
        )));
    }
    Ok(rounded as i64)
}
