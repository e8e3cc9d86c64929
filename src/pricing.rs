//! Tiered quantity pricing
//!
//! A tier list maps cumulative quantity bands to unit prices (e.g. 1–9 pieces
//! at full price, 10+ at the bulk rate). Lookup is last-match-wins over tiers
//! sorted by `min_quantity`, so overlapping tiers degrade to the tier with
//! the highest matching lower bound rather than erroring.

use rusty_money::{Money, iso::Currency};

/// A single quantity band within a tier list.
///
/// The band is inclusive on both ends; an absent `max_quantity` marks the
/// unbounded top tier.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTier<'a> {
    min_quantity: u32,
    max_quantity: Option<u32>,
    unit_price: Money<'a, Currency>,
}

impl<'a> PriceTier<'a> {
    /// Create a new price tier.
    #[must_use]
    pub fn new(
        min_quantity: u32,
        max_quantity: Option<u32>,
        unit_price: Money<'a, Currency>,
    ) -> Self {
        Self {
            min_quantity,
            max_quantity,
            unit_price,
        }
    }

    /// Return the inclusive lower quantity bound.
    pub fn min_quantity(&self) -> u32 {
        self.min_quantity
    }

    /// Return the inclusive upper quantity bound, `None` when unbounded.
    pub fn max_quantity(&self) -> Option<u32> {
        self.max_quantity
    }

    /// Return the unit price for quantities inside this band.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Whether `quantity` falls inside this band.
    pub fn contains(&self, quantity: u32) -> bool {
        self.min_quantity <= quantity && self.max_quantity.is_none_or(|max| quantity <= max)
    }
}

/// Look up the unit price for a cumulative quantity.
///
/// Tiers may arrive in any order; a copy is sorted ascending by
/// `min_quantity` and the caller's sequence is left untouched. The lowest
/// tier's price seeds the result, then every band containing `quantity`
/// overwrites it in ascending order — the last matching tier wins. A
/// quantity outside every band keeps the seeded default.
///
/// An empty tier list prices at zero in `currency`, which callers render as
/// "no pricing configured".
pub fn price_for_quantity<'a>(
    tiers: &[PriceTier<'a>],
    quantity: u32,
    currency: &'static Currency,
) -> Money<'a, Currency> {
    let mut sorted: Vec<&PriceTier<'a>> = tiers.iter().collect();
    sorted.sort_by_key(|tier| tier.min_quantity);

    let Some(lowest) = sorted.first() else {
        return Money::from_minor(0, currency);
    };

    let mut price = lowest.unit_price;

    for tier in sorted {
        if tier.contains(quantity) {
            price = tier.unit_price;
        }
    }

    price
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;

    use super::*;

    fn two_band_tiers<'a>() -> Vec<PriceTier<'a>> {
        vec![
            PriceTier::new(0, Some(9), Money::from_minor(100_00, USD)),
            PriceTier::new(10, None, Money::from_minor(90_00, USD)),
        ]
    }

    #[test]
    fn quantity_in_lower_band_prices_at_lower_tier() {
        let tiers = two_band_tiers();

        assert_eq!(
            price_for_quantity(&tiers, 5, USD),
            Money::from_minor(100_00, USD)
        );
    }

    #[test]
    fn quantity_at_upper_band_boundary_prices_at_upper_tier() {
        let tiers = two_band_tiers();

        assert_eq!(
            price_for_quantity(&tiers, 10, USD),
            Money::from_minor(90_00, USD)
        );
    }

    #[test]
    fn zero_quantity_prices_at_lowest_tier() {
        let tiers = two_band_tiers();

        assert_eq!(
            price_for_quantity(&tiers, 0, USD),
            Money::from_minor(100_00, USD)
        );
    }

    #[test]
    fn overlapping_tiers_resolve_to_highest_matching_lower_bound() {
        let tiers = vec![
            PriceTier::new(0, Some(20), Money::from_minor(100_00, USD)),
            PriceTier::new(10, None, Money::from_minor(90_00, USD)),
        ];

        // Both bands contain 15; the tier with min_quantity 10 wins.
        assert_eq!(
            price_for_quantity(&tiers, 15, USD),
            Money::from_minor(90_00, USD)
        );
    }

    #[test]
    fn empty_tiers_price_at_zero() {
        let tiers: Vec<PriceTier<'_>> = Vec::new();

        assert_eq!(
            price_for_quantity(&tiers, 7, USD),
            Money::from_minor(0, USD)
        );
    }

    #[test]
    fn unsorted_input_resolves_as_if_sorted() {
        let mut tiers = two_band_tiers();
        tiers.reverse();

        assert_eq!(
            price_for_quantity(&tiers, 3, USD),
            Money::from_minor(100_00, USD)
        );
        assert_eq!(
            price_for_quantity(&tiers, 12, USD),
            Money::from_minor(90_00, USD)
        );
    }

    #[test]
    fn lookup_leaves_caller_order_untouched() {
        let mut tiers = two_band_tiers();
        tiers.reverse();

        let before: Vec<u32> = tiers.iter().map(PriceTier::min_quantity).collect();
        let _price = price_for_quantity(&tiers, 12, USD);
        let after: Vec<u32> = tiers.iter().map(PriceTier::min_quantity).collect();

        assert_eq!(before, after);
    }

    #[test]
    fn quantity_in_a_gap_keeps_the_lowest_tier_default() {
        let tiers = vec![
            PriceTier::new(0, Some(4), Money::from_minor(100_00, USD)),
            PriceTier::new(10, None, Money::from_minor(90_00, USD)),
        ];

        assert_eq!(
            price_for_quantity(&tiers, 7, USD),
            Money::from_minor(100_00, USD)
        );
    }

    #[test]
    fn bounded_band_contains_its_edges() {
        let tier = PriceTier::new(5, Some(9), Money::from_minor(50_00, USD));

        assert!(tier.contains(5));
        assert!(tier.contains(9));
        assert!(!tier.contains(4));
        assert!(!tier.contains(10));
    }

    #[test]
    fn unbounded_band_contains_everything_above_its_floor() {
        let tier = PriceTier::new(10, None, Money::from_minor(50_00, USD));

        assert!(tier.contains(10));
        assert!(tier.contains(10_000));
        assert!(!tier.contains(9));
    }
}
