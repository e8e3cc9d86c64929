//! Cart
//!
//! A cart owns its lines, the tier lists they price against, and the pricing
//! context (audience and currency) resolved before the first mutation. Every
//! mutation runs the pooled recompute synchronously, so callers always
//! observe line prices consistent with the pooled quantities.

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    catalog::{PricingAudience, ProductSnapshot},
    pooling::PoolKey,
    pricing::{PriceTier, price_for_quantity},
};

/// Errors related to cart mutation.
#[derive(Debug, Error)]
pub enum CartError {
    /// A product's pricing currency differs from the cart currency
    /// (product, pricing currency, cart currency).
    #[error("product {0} is priced in {1}, but cart is in {2}")]
    CurrencyMismatch(Uuid, &'static str, &'static str),
}

/// Result of an add-to-cart call.
///
/// Hitting the stock ceiling is a normal UI boundary condition, not an
/// error: the cart is left unchanged and the caller may disable its "+"
/// control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The line was created or its quantity incremented.
    Added,

    /// The line already holds its stock ceiling; the cart is unchanged.
    AtStockCeiling,
}

/// Deterministic cart line identity: product plus selected variation.
///
/// Repeated adds for the same combination merge into one line; a different
/// variation opens a distinct line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    product: Uuid,
    variation: Option<String>,
}

impl LineKey {
    /// Create a line key for a product and optional variation.
    #[must_use]
    pub fn new(product: Uuid, variation: Option<&str>) -> Self {
        Self {
            product,
            variation: variation.map(str::to_owned),
        }
    }

    /// Return the product identity.
    pub fn product(&self) -> Uuid {
        self.product
    }

    /// Return the selected variation, if any.
    pub fn variation(&self) -> Option<&str> {
        self.variation.as_deref()
    }
}

/// One cart line.
///
/// `unit_price` is derived by the pooled recompute and never settable by
/// callers; the stock ceiling is the snapshot value captured when the line
/// was first added.
#[derive(Debug, Clone)]
pub struct CartLine<'a> {
    product: Uuid,
    name: String,
    variation: Option<String>,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    pool: PoolKey,
    stock_ceiling: u32,
}

impl<'a> CartLine<'a> {
    /// Return the product identity.
    pub fn product(&self) -> Uuid {
        self.product
    }

    /// Return the product display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the selected variation, if any.
    pub fn variation(&self) -> Option<&str> {
        self.variation.as_deref()
    }

    /// Return the line quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Return the pooled unit price.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Return the pricing pool this line belongs to.
    pub fn pool(&self) -> PoolKey {
        self.pool
    }

    /// Return the stock ceiling captured at add-time.
    pub fn stock_ceiling(&self) -> u32 {
        self.stock_ceiling
    }

    /// Return the line total (unit price times quantity).
    pub fn line_total(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.unit_price.to_minor_units() * i64::from(self.quantity),
            self.unit_price.currency(),
        )
    }
}

/// Cart
#[derive(Debug)]
pub struct Cart<'a> {
    lines: FxHashMap<LineKey, CartLine<'a>>,
    tables: FxHashMap<PoolKey, Vec<PriceTier<'a>>>,
    audience: PricingAudience,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart for a currency and a resolved audience.
    #[must_use]
    pub fn new(currency: &'static Currency, audience: PricingAudience) -> Self {
        Self {
            lines: FxHashMap::default(),
            tables: FxHashMap::default(),
            audience,
            currency,
        }
    }

    /// Get the audience this cart prices for.
    pub fn audience(&self) -> PricingAudience {
        self.audience
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate over the lines in the cart. Iteration order is unspecified;
    /// display ordering is a caller concern.
    pub fn iter(&self) -> impl Iterator<Item = (&LineKey, &CartLine<'a>)> {
        self.lines.iter()
    }

    /// Get a line by its key.
    pub fn line(&self, key: &LineKey) -> Option<&CartLine<'a>> {
        self.lines.get(key)
    }

    /// Add one unit of a product (with an optional selected variation).
    ///
    /// A line already holding its stock ceiling rejects the add silently via
    /// [`AddOutcome::AtStockCeiling`]. Otherwise the line is created or
    /// incremented, and the affected pricing pool is recomputed before the
    /// call returns.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::CurrencyMismatch`] when the snapshot's pricing
    /// currency differs from the cart currency.
    pub fn add_line(
        &mut self,
        snapshot: &ProductSnapshot<'a>,
        variation: Option<&str>,
    ) -> Result<AddOutcome, CartError> {
        if let Some(table) = &snapshot.pricing
            && table.currency() != self.currency
        {
            return Err(CartError::CurrencyMismatch(
                snapshot.product,
                table.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let key = LineKey::new(snapshot.product, variation);
        let current = self.lines.get(&key).map_or(0, |line| line.quantity);

        if current >= snapshot.stock {
            return Ok(AddOutcome::AtStockCeiling);
        }

        let tiers: &[PriceTier<'a>] = match &snapshot.pricing {
            Some(table) => table.tiers(self.audience),
            None => &[],
        };

        let pool = PoolKey::of(tiers);

        if pool.is_priced() {
            self.tables.entry(pool).or_insert_with(|| tiers.to_vec());
        }

        let placeholder = Money::from_minor(0, self.currency);

        self.lines
            .entry(key)
            .and_modify(|line| line.quantity += 1)
            .or_insert_with(|| CartLine {
                product: snapshot.product,
                name: snapshot.name.clone(),
                variation: variation.map(str::to_owned),
                quantity: 1,
                unit_price: placeholder,
                pool,
                stock_ceiling: snapshot.stock,
            });

        self.repool(pool);

        Ok(AddOutcome::Added)
    }

    /// Remove one unit of a line; the line is deleted when its quantity
    /// reaches zero. The pool is recomputed either way, since the group
    /// quantity changed. An absent key is a no-op.
    pub fn remove_line(&mut self, key: &LineKey) {
        let Some(line) = self.lines.get_mut(key) else {
            return;
        };

        let pool = line.pool;
        line.quantity = line.quantity.saturating_sub(1);

        if line.quantity == 0 {
            self.lines.remove(key);
        }

        self.repool(pool);
    }

    /// Calculate the cart total: the sum of unit price times quantity over
    /// all lines. Pure; returns zero for an empty cart.
    pub fn total(&self) -> Money<'a, Currency> {
        let total_minor: i64 = self
            .lines
            .values()
            .map(|line| line.unit_price.to_minor_units() * i64::from(line.quantity))
            .sum();

        Money::from_minor(total_minor, self.currency)
    }

    /// Discard every line. Used after a committed checkout or an explicit
    /// "empty cart" action.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.tables.clear();
    }

    /// Recompute every pricing pool in the cart.
    ///
    /// Mutations already recompute their own pool; this whole-cart pass is
    /// for callers that rebuilt cart state wholesale.
    pub fn repool_all(&mut self) {
        let mut pools: SmallVec<[PoolKey; 8]> = SmallVec::new();

        for line in self.lines.values() {
            if line.pool.is_priced() && !pools.contains(&line.pool) {
                pools.push(line.pool);
            }
        }

        for pool in pools {
            self.repool(pool);
        }
    }

    /// Recompute one pricing pool: sum the quantities of its lines, look up
    /// the pooled unit price, and write it onto every line of the pool.
    /// Lines without pricing stay at zero.
    fn repool(&mut self, pool: PoolKey) {
        if !pool.is_priced() {
            return;
        }

        let group_quantity: u32 = self
            .lines
            .values()
            .filter(|line| line.pool == pool)
            .map(|line| line.quantity)
            .sum();

        let price = match self.tables.get(&pool) {
            Some(tiers) => price_for_quantity(tiers, group_quantity, self.currency),
            None => Money::from_minor(0, self.currency),
        };

        for line in self.lines.values_mut().filter(|line| line.pool == pool) {
            line.unit_price = price;
        }
    }
}

#[cfg(test)]
impl<'a> CartLine<'a> {
    /// Build a raw line, bypassing snapshot validation. Lets boundary tests
    /// exercise states a well-formed cart cannot reach.
    pub(crate) fn raw(
        product: Uuid,
        name: &str,
        quantity: u32,
        unit_price: Money<'a, Currency>,
        pool: PoolKey,
        stock_ceiling: u32,
    ) -> Self {
        Self {
            product,
            name: name.to_owned(),
            variation: None,
            quantity,
            unit_price,
            pool,
            stock_ceiling,
        }
    }
}

#[cfg(test)]
impl<'a> Cart<'a> {
    /// Force a raw line into the cart without repricing.
    pub(crate) fn insert_raw_line(&mut self, key: LineKey, line: CartLine<'a>) {
        self.lines.insert(key, line);
    }
}
