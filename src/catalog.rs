//! Catalog snapshots
//!
//! The catalog itself lives in the external document store. This module
//! holds the read-only snapshot shapes the engine works against: the pricing
//! audience resolved from the signed-in principal's role, the per-collection
//! tier table, and the product snapshot captured when a line is added to a
//! cart. Snapshots are never re-fetched during a cart session.

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::pricing::{PriceTier, price_for_quantity};

/// Errors related to tier table construction.
#[derive(Debug, Error)]
pub enum TierTableError {
    /// A tier's currency differs from the table currency
    /// (audience, tier index, tier currency, table currency).
    #[error("{0} tier {1} has currency {2}, but table has currency {3}")]
    CurrencyMismatch(PricingAudience, usize, &'static str, &'static str),
}

/// Which tier list applies to the current principal.
///
/// Resolved once from the principal's role before cart operations begin and
/// held fixed for the life of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingAudience {
    /// Standard storefront pricing.
    Retail,

    /// Bulk pricing for approved wholesale buyers.
    Wholesaler,
}

impl PricingAudience {
    /// Resolve the audience from a principal's role string.
    ///
    /// Only the `wholesaler` role selects wholesale pricing; any other role
    /// (including an absent one) falls back to retail.
    pub fn from_role(role: &str) -> Self {
        if role.eq_ignore_ascii_case("wholesaler") {
            Self::Wholesaler
        } else {
            Self::Retail
        }
    }
}

impl fmt::Display for PricingAudience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retail => f.write_str("retail"),
            Self::Wholesaler => f.write_str("wholesaler"),
        }
    }
}

/// The quantity-price bands of one merchandising collection, one list per
/// audience.
///
/// Every product in the collection shares this table; pooling compares
/// tables by value (see [`crate::pooling::PoolKey`]), so collections with
/// identical bands intentionally share a quantity pool.
#[derive(Debug, Clone, PartialEq)]
pub struct TierTable<'a> {
    retail: Vec<PriceTier<'a>>,
    wholesale: Vec<PriceTier<'a>>,
    currency: &'static Currency,
}

impl<'a> TierTable<'a> {
    /// Create a tier table, validating that every tier matches `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`TierTableError::CurrencyMismatch`] naming the offending
    /// audience and tier index.
    pub fn new(
        retail: Vec<PriceTier<'a>>,
        wholesale: Vec<PriceTier<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, TierTableError> {
        for (audience, tiers) in [
            (PricingAudience::Retail, &retail),
            (PricingAudience::Wholesaler, &wholesale),
        ] {
            for (i, tier) in tiers.iter().enumerate() {
                let tier_currency = tier.unit_price().currency();

                if tier_currency != currency {
                    return Err(TierTableError::CurrencyMismatch(
                        audience,
                        i,
                        tier_currency.iso_alpha_code,
                        currency.iso_alpha_code,
                    ));
                }
            }
        }

        Ok(Self {
            retail,
            wholesale,
            currency,
        })
    }

    /// Return the tier list for an audience.
    pub fn tiers(&self, audience: PricingAudience) -> &[PriceTier<'a>] {
        match audience {
            PricingAudience::Retail => &self.retail,
            PricingAudience::Wholesaler => &self.wholesale,
        }
    }

    /// Unit price shown on listing and sort views: the tier price for a
    /// quantity of one. `None` when the audience has no tiers configured,
    /// which callers render as "N/A".
    pub fn display_price(&self, audience: PricingAudience) -> Option<Money<'a, Currency>> {
        let tiers = self.tiers(audience);

        if tiers.is_empty() {
            None
        } else {
            Some(price_for_quantity(tiers, 1, self.currency))
        }
    }

    /// Get the currency of the tier table.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Read-only product snapshot handed to the cart at add-to-cart time.
///
/// Carries everything the engine needs later: identity, the stock ceiling
/// captured now and trusted through checkout, and the owning collection's
/// tier table (absent when the collection has no pricing configured).
#[derive(Debug, Clone)]
pub struct ProductSnapshot<'a> {
    /// Product identity in the external catalog.
    pub product: Uuid,

    /// Display name.
    pub name: String,

    /// Selectable variations (e.g. colours); empty for plain products.
    pub variations: Vec<String>,

    /// Stock ceiling at snapshot time.
    pub stock: u32,

    /// The owning collection's tier table, if one is configured.
    pub pricing: Option<TierTable<'a>>,
}
