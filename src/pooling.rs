//! Pricing pools
//!
//! Cart lines pool their quantities for tier lookup when they share an
//! identical tier list by value, not by owning collection — two collections
//! configured with the same bands and prices are one pool. The pool key is a
//! fingerprint over the canonicalised tier list, so the order tiers arrive
//! in never affects equality.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use rustc_hash::FxHasher;

use crate::pricing::PriceTier;

/// Grouping key for cart lines that share one quantity pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKey {
    /// Fingerprint of a configured tier list.
    Table(u64),

    /// The owning collection has no tier list; lines carrying this key are
    /// excluded from pooling and price at zero.
    NoPricing,
}

impl PoolKey {
    /// Fingerprint a tier list.
    ///
    /// Tiers are sorted by bounds and price before hashing, so set-equal
    /// lists produce the same key regardless of order, while any changed
    /// bound, price or currency produces a different one. An empty list maps
    /// to [`PoolKey::NoPricing`].
    pub fn of(tiers: &[PriceTier<'_>]) -> Self {
        if tiers.is_empty() {
            return Self::NoPricing;
        }

        let mut sorted: Vec<&PriceTier<'_>> = tiers.iter().collect();
        sorted.sort_by_key(|tier| {
            (
                tier.min_quantity(),
                tier.max_quantity(),
                tier.unit_price().to_minor_units(),
            )
        });

        let mut hasher = FxHasher::default();

        for tier in sorted {
            tier.min_quantity().hash(&mut hasher);
            tier.max_quantity().hash(&mut hasher);
            tier.unit_price().to_minor_units().hash(&mut hasher);
            tier.unit_price().currency().iso_alpha_code.hash(&mut hasher);
        }

        Self::Table(hasher.finish())
    }

    /// Whether this key belongs to a configured tier list.
    pub fn is_priced(&self) -> bool {
        matches!(self, Self::Table(_))
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(fingerprint) => write!(f, "{fingerprint:016x}"),
            Self::NoPricing => f.write_str("none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};

    use super::*;

    fn tier(min: u32, max: Option<u32>, price_minor: i64) -> PriceTier<'static> {
        PriceTier::new(min, max, Money::from_minor(price_minor, USD))
    }

    #[test]
    fn fingerprint_is_order_independent() {
        let forward = [tier(0, Some(9), 100_00), tier(10, None, 90_00)];
        let reversed = [tier(10, None, 90_00), tier(0, Some(9), 100_00)];

        assert_eq!(PoolKey::of(&forward), PoolKey::of(&reversed));
    }

    #[test]
    fn changed_price_changes_the_fingerprint() {
        let original = [tier(0, Some(9), 100_00), tier(10, None, 90_00)];
        let repriced = [tier(0, Some(9), 100_00), tier(10, None, 85_00)];

        assert_ne!(PoolKey::of(&original), PoolKey::of(&repriced));
    }

    #[test]
    fn changed_bound_changes_the_fingerprint() {
        let original = [tier(0, Some(9), 100_00), tier(10, None, 90_00)];
        let rebanded = [tier(0, Some(11), 100_00), tier(12, None, 90_00)];

        assert_ne!(PoolKey::of(&original), PoolKey::of(&rebanded));
    }

    #[test]
    fn bounded_and_unbounded_top_tier_differ() {
        let bounded = [tier(0, Some(9), 100_00)];
        let unbounded = [tier(0, None, 100_00)];

        assert_ne!(PoolKey::of(&bounded), PoolKey::of(&unbounded));
    }

    #[test]
    fn empty_list_has_no_pricing() {
        let key = PoolKey::of(&[]);

        assert_eq!(key, PoolKey::NoPricing);
        assert!(!key.is_priced());
    }

    #[test]
    fn table_key_is_priced() {
        let key = PoolKey::of(&[tier(0, None, 100_00)]);

        assert!(key.is_priced());
    }

    #[test]
    fn display_renders_fingerprint_as_hex() {
        let key = PoolKey::Table(0xabcd);

        assert_eq!(key.to_string(), "000000000000abcd");
        assert_eq!(PoolKey::NoPricing.to_string(), "none");
    }
}
