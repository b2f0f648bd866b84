//! Commerce service client (carts, checkouts, orders)

use markethub_domain::constants::{
    COMMERCE_CARTS_PATH, COMMERCE_CHECKOUTS_PATH, COMMERCE_ORDERS_PATH,
};
use markethub_domain::{
    AddCartItem, Cart, CartItem, Checkout, CreateCheckout, Order, Result, UpdateCartItem,
};
use serde::de::IgnoredAny;
use tracing::{info, instrument};

use super::context::RequestContext;
use crate::http::{RequestOptions, SessionClient};

/// Failure message for a rejected checkout without a usable error body.
const CHECKOUT_FAILED: &str = "Checkout failed.";

/// Authenticated commerce calls. Every request carries the caller's identity
/// and survives one expired session.
#[derive(Debug, Clone)]
pub struct CommerceApi {
    base_url: String,
    session: SessionClient,
    context: RequestContext,
}

impl CommerceApi {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        session: SessionClient,
        context: RequestContext,
    ) -> Self {
        Self { base_url: base_url.into(), session, context }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn item_url(&self, cart_id: i64, item_id: i64) -> String {
        self.url(&format!("{COMMERCE_CARTS_PATH}/{cart_id}/items/{item_id}"))
    }

    /// The caller's active cart, created on first use.
    ///
    /// # Errors
    /// Returns `MarketHubError::Request` (status 401) for anonymous callers.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<Cart> {
        let options = self.context.authorize(RequestOptions::post());
        self.session.send_json(&self.url(COMMERCE_CARTS_PATH), &options).await
    }

    /// # Errors
    /// Returns `MarketHubError::Request` (status 404) for a cart the caller
    /// does not own.
    #[instrument(skip(self))]
    pub async fn cart_by_id(&self, cart_id: i64) -> Result<Cart> {
        let options = self.context.authorize(RequestOptions::get());
        let url = self.url(&format!("{COMMERCE_CARTS_PATH}/{cart_id}"));
        self.session.send_json(&url, &options).await
    }

    /// # Errors
    /// Returns the service's rejection, e.g. an unknown cart.
    #[instrument(skip(self, item), fields(product_id = item.product_id, qty = item.qty))]
    pub async fn add_item(&self, cart_id: i64, item: &AddCartItem) -> Result<CartItem> {
        let options = self.context.authorize(RequestOptions::post()).json(item)?;
        let url = self.url(&format!("{COMMERCE_CARTS_PATH}/{cart_id}/items"));
        self.session.send_json(&url, &options).await
    }

    /// # Errors
    /// Returns the service's rejection, e.g. an unknown item.
    #[instrument(skip(self))]
    pub async fn update_item(&self, cart_id: i64, item_id: i64, qty: u32) -> Result<CartItem> {
        let options =
            self.context.authorize(RequestOptions::patch()).json(&UpdateCartItem { qty })?;
        self.session.send_json(&self.item_url(cart_id, item_id), &options).await
    }

    /// # Errors
    /// Returns the service's rejection, e.g. an unknown item.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, cart_id: i64, item_id: i64) -> Result<()> {
        let options = self.context.authorize(RequestOptions::delete());
        self.session.send_json::<IgnoredAny>(&self.item_url(cart_id, item_id), &options).await?;
        Ok(())
    }

    /// The caller's orders, newest first as returned by the service.
    ///
    /// # Errors
    /// Returns the first failing page's error.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>> {
        let options = self.context.authorize(RequestOptions::get());
        self.session.json().collect_all(&self.url(COMMERCE_ORDERS_PATH), &options).await
    }

    /// # Errors
    /// Returns `MarketHubError::Request` (status 404) for an unknown order.
    #[instrument(skip(self))]
    pub async fn order(&self, order_id: i64) -> Result<Order> {
        let options = self.context.authorize(RequestOptions::get());
        let url = self.url(&format!("{COMMERCE_ORDERS_PATH}/{order_id}"));
        self.session.send_json(&url, &options).await
    }

    /// # Errors
    /// Returns `MarketHubError::Request` (status 400) once an order is paid.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: i64) -> Result<Order> {
        let options = self.context.authorize(RequestOptions::post());
        let url = self.url(&format!("{COMMERCE_ORDERS_PATH}/{order_id}/cancel"));
        let order: Order = self.session.send_json(&url, &options).await?;
        info!(order_id, status = %order.status, "Order canceled");
        Ok(order)
    }

    /// Turn a cart into an order.
    ///
    /// Replaying the same `idempotency_key` returns the original checkout.
    ///
    /// # Errors
    /// Returns the service's rejection (e.g. `Cart is empty`), or
    /// `Checkout failed.` when it gave no reason.
    #[instrument(skip(self, request, idempotency_key), fields(cart_id = request.cart_id))]
    pub async fn create_checkout(
        &self,
        request: &CreateCheckout,
        idempotency_key: &str,
    ) -> Result<Checkout> {
        let options = self
            .context
            .authorize(RequestOptions::post())
            .idempotency_key(idempotency_key)
            .json(request)?;

        let checkout: Checkout = self
            .session
            .send_json_or(&self.url(COMMERCE_CHECKOUTS_PATH), &options, CHECKOUT_FAILED)
            .await?;
        info!(order_id = checkout.order_id, "Checkout created");
        Ok(checkout)
    }
}
