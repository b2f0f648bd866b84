//! Payment service client

use markethub_domain::constants::PAYMENT_PAYMENTS_PATH;
use markethub_domain::{CreatePayment, PaymentResponse, PaymentView, Result};
use tracing::{info, instrument};

use super::context::RequestContext;
use crate::http::{RequestOptions, SessionClient};

const PAYMENT_FAILED: &str = "Payment failed.";

#[derive(Debug, Clone)]
pub struct PaymentApi {
    base_url: String,
    session: SessionClient,
    context: RequestContext,
}

impl PaymentApi {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        session: SessionClient,
        context: RequestContext,
    ) -> Self {
        Self { base_url: base_url.into(), session, context }
    }

    /// Start a payment for an order.
    ///
    /// The provider deduplicates on `idempotency_key`, so a retried call
    /// returns the payment created by the first one.
    ///
    /// # Errors
    /// Returns the service's rejection, or `Payment failed.` when it gave no
    /// reason.
    #[instrument(skip(self, request, idempotency_key), fields(order_id = %request.order_id))]
    pub async fn create_payment(
        &self,
        request: &CreatePayment,
        idempotency_key: &str,
    ) -> Result<PaymentResponse> {
        let options = self
            .context
            .authorize(RequestOptions::post())
            .idempotency_key(idempotency_key)
            .json(request)?;

        let url = format!("{}{PAYMENT_PAYMENTS_PATH}", self.base_url);
        let payment: PaymentResponse =
            self.session.send_json_or(&url, &options, PAYMENT_FAILED).await?;
        info!(payment_id = payment.payment_id, status = %payment.status, "Payment created");
        Ok(payment)
    }

    /// Current state of a payment.
    ///
    /// # Errors
    /// Returns `MarketHubError::Request` (status 404) for an unknown payment.
    #[instrument(skip(self))]
    pub async fn payment(&self, payment_id: i64) -> Result<PaymentView> {
        let options = self.context.authorize(RequestOptions::get());
        let url = format!("{}{PAYMENT_PAYMENTS_PATH}/{payment_id}", self.base_url);
        self.session.send_json(&url, &options).await
    }
}
