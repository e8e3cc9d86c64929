//! Karat prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{AddOutcome, Cart, CartError, CartLine, LineKey},
    catalog::{PricingAudience, ProductSnapshot, TierTable, TierTableError},
    checkout::{
        BuyerInfo, Checkout, CheckoutError, ExternalError, NewOrder, OrderItem, OrderSink,
        OrderStatus, StockWriter,
    },
    fixtures::{Fixture, FixtureError},
    notify::{NotifyConfig, NotifyError, OrderNotifier},
    pooling::PoolKey,
    pricing::{PriceTier, price_for_quantity},
};
