//! Checkout
//!
//! The commit boundary between the in-memory cart and the external order
//! store. The order document is persisted first; stock ceilings are then
//! decremented per line, best-effort and non-transactional, and the cart is
//! cleared only once the order write has succeeded. A stock write failing
//! after the order write leaves the order standing and is only logged.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cart::{Cart, CartLine};

/// Failure reported by an external collaborator.
pub type ExternalError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while committing a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines; nothing to commit.
    #[error("cart is empty")]
    EmptyCart,

    /// Validation dropped every line from the outgoing order.
    #[error("cart contains invalid items")]
    InvalidItems,

    /// The order store rejected or failed the write. Retryable; the cart is
    /// left untouched.
    #[error("order storage error")]
    OrderSink(#[source] ExternalError),
}

/// Persists order documents in the external store.
#[automock]
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Persist a new order and return its generated identifier. No
    /// idempotency key is attached; retries may create duplicates.
    async fn create_order(&self, order: NewOrder) -> Result<String, ExternalError>;
}

/// Overwrites per-product stock counts in the external store.
///
/// The overwrite is non-transactional across lines and across sessions: two
/// buyers can both reserve the last unit, and a partial failure leaves stock
/// inconsistent with the committed order. Both gaps are accepted.
#[automock]
#[async_trait]
pub trait StockWriter: Send + Sync {
    /// Overwrite a product's stock count.
    async fn write_stock(&self, product: Uuid, quantity: u32) -> Result<(), ExternalError>;
}

/// One line of the outgoing order payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product identity in the external catalog.
    pub product_id: Uuid,

    /// Committed quantity.
    pub quantity: u32,

    /// Pooled unit price at commit time, in minor units.
    pub unit_price_at_order: i64,

    /// Fingerprint of the tier table the line was priced against.
    pub tier_table_ref: String,

    /// Selected variation, when the product has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
}

impl OrderItem {
    /// Validate a cart line into an order item.
    ///
    /// Returns `None` for a line that would corrupt the order document (no
    /// quantity, negative price); such lines are dropped from the payload.
    pub fn from_line(line: &CartLine<'_>) -> Option<Self> {
        if line.quantity() == 0 || line.unit_price().to_minor_units() < 0 {
            return None;
        }

        Some(Self {
            product_id: line.product(),
            quantity: line.quantity(),
            unit_price_at_order: line.unit_price().to_minor_units(),
            tier_table_ref: line.pool().to_string(),
            variation: line.variation().map(str::to_owned),
        })
    }
}

/// Buyer contact details captured at checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerInfo {
    /// Buyer display name.
    pub name: String,

    /// Contact phone number.
    pub phone: String,

    /// Delivery address; absent for counter sales.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Order lifecycle states as stored on the order document.
///
/// Checkout only ever produces [`OrderStatus::Pending`]; the remaining
/// states are advanced by the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderStatus {
    /// Freshly created, awaiting confirmation.
    Pending,

    /// Confirmed by the back office.
    Confirmed,

    /// Handed to the courier.
    Shipped,

    /// Received by the buyer.
    Delivered,

    /// Cancelled before delivery.
    Cancelled,
}

/// Outgoing order payload for the external order store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Validated order lines.
    pub items: Vec<OrderItem>,

    /// Sum of line totals over the validated lines, in minor units.
    pub total_amount: i64,

    /// ISO currency code for every amount in the payload.
    pub currency: String,

    /// Buyer contact details.
    pub buyer_info: BuyerInfo,

    /// Always [`OrderStatus::Pending`] at creation.
    pub status: OrderStatus,

    /// Creation timestamp.
    pub created_at: Timestamp,
}

/// Checkout
#[derive(Debug)]
pub struct Checkout<S, W> {
    sink: S,
    stock: W,
}

impl<S: OrderSink, W: StockWriter> Checkout<S, W> {
    /// Create a checkout boundary over an order sink and a stock writer.
    #[must_use]
    pub fn new(sink: S, stock: W) -> Self {
        Self { sink, stock }
    }

    /// Commit the cart as a new order.
    ///
    /// Lines failing validation are dropped from the payload (logged, not
    /// surfaced per line). The cart is cleared only after the order write
    /// succeeds; stock decrements run afterwards, per line and best-effort,
    /// using the ceiling captured at add-time.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: the cart has no lines.
    /// - [`CheckoutError::InvalidItems`]: validation dropped every line.
    /// - [`CheckoutError::OrderSink`]: the order write failed; the cart is
    ///   preserved for retry.
    #[tracing::instrument(skip_all, fields(lines = cart.len(), audience = %cart.audience()))]
    pub async fn commit(
        &self,
        cart: &mut Cart<'_>,
        buyer: BuyerInfo,
    ) -> Result<String, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut items = Vec::with_capacity(cart.len());
        let mut stock_writes = Vec::with_capacity(cart.len());

        for (_, line) in cart.iter() {
            let Some(item) = OrderItem::from_line(line) else {
                warn!(product = %line.product(), "dropping invalid cart line from order");
                continue;
            };

            stock_writes.push((
                line.product(),
                line.stock_ceiling().saturating_sub(line.quantity()),
            ));
            items.push(item);
        }

        if items.is_empty() {
            return Err(CheckoutError::InvalidItems);
        }

        let total_amount = items
            .iter()
            .map(|item| item.unit_price_at_order * i64::from(item.quantity))
            .sum();

        let order = NewOrder {
            items,
            total_amount,
            currency: cart.currency().iso_alpha_code.to_string(),
            buyer_info: buyer,
            status: OrderStatus::Pending,
            created_at: Timestamp::now(),
        };

        let order_id = self
            .sink
            .create_order(order)
            .await
            .map_err(CheckoutError::OrderSink)?;

        info!(%order_id, total_amount, "order stored");

        for (product, remaining) in stock_writes {
            if let Err(error) = self.stock.write_stock(product, remaining).await {
                warn!(%product, %error, "stock update failed after order commit");
            }
        }

        cart.clear();

        Ok(order_id)
    }
}
