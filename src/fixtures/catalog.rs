//! Catalog Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};
use serde::Deserialize;

use crate::{fixtures::FixtureError, pricing::PriceTier};

/// Wrapper for a catalog set in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of collection key -> collection fixture
    pub collections: FxHashMap<String, CollectionFixture>,

    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// A merchandising collection with its audience tier lists
#[derive(Debug, Deserialize)]
pub struct CollectionFixture {
    /// Retail quantity bands
    #[serde(default)]
    pub retail: Vec<TierFixture>,

    /// Wholesale quantity bands
    #[serde(default)]
    pub wholesale: Vec<TierFixture>,
}

/// One quantity band in YAML
#[derive(Debug, Deserialize)]
pub struct TierFixture {
    /// Inclusive lower quantity bound
    pub min: u32,

    /// Inclusive upper quantity bound; omitted for the unbounded top band
    #[serde(default)]
    pub max: Option<u32>,

    /// Unit price (e.g., "120.00 USD")
    pub price: String,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product display name
    pub name: String,

    /// Owning collection key; omitted for products without pricing
    #[serde(default)]
    pub collection: Option<String>,

    /// Stock ceiling
    pub stock: u32,

    /// Selectable variations
    #[serde(default)]
    pub variations: Vec<String>,
}

/// Convert YAML tier bands into price tiers, enforcing one currency per
/// fixture set via `currency_slot`.
///
/// # Errors
///
/// Returns an error on an unparsable price, an unknown currency code, or a
/// currency differing from the one already established for the set.
pub fn convert_tiers(
    tiers: &[TierFixture],
    currency_slot: &mut Option<&'static Currency>,
) -> Result<Vec<PriceTier<'static>>, FixtureError> {
    let mut converted = Vec::with_capacity(tiers.len());

    for tier in tiers {
        let (minor_units, currency) = parse_price(&tier.price)?;

        match currency_slot {
            Some(existing) if *existing != currency => {
                return Err(FixtureError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }
            Some(_) => {}
            None => *currency_slot = Some(currency),
        }

        converted.push(PriceTier::new(
            tier.min,
            tier.max,
            Money::from_minor(minor_units, currency),
        ));
    }

    Ok(converted)
}

/// Parse price string (e.g., "120.00 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "USD" => USD,
        "EUR" => EUR,
        "GBP" => GBP,
        "INR" => INR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}
