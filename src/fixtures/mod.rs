//! Fixtures
//!
//! Named catalog sets loaded from YAML, standing in for the external
//! document store in demos and integration tests. A set defines
//! merchandising collections (with their audience tier lists) and products
//! referencing them; loading produces the same read-only snapshots the
//! storefront would capture from the managed backend.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    cart::Cart,
    catalog::{PricingAudience, ProductSnapshot, TierTable, TierTableError},
    fixtures::catalog::CatalogFixture,
};

pub mod catalog;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch within a fixture set
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Product references a collection the set does not define
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// No priced collection loaded yet
    #[error("No priced collection loaded yet; currency unknown")]
    NoCurrency,

    /// Tier table construction error
    #[error(transparent)]
    TierTable(#[from] TierTableError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Collection key -> tier table
    collections: FxHashMap<String, TierTable<'static>>,

    /// Product key -> snapshot
    products: FxHashMap<String, ProductSnapshot<'static>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            collections: FxHashMap::default(),
            products: FxHashMap::default(),
            currency: None,
        }
    }

    /// Load a catalog set from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if prices are
    /// malformed or mix currencies, or if a product references an undefined
    /// collection.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalogs").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        for (key, collection) in fixture.collections {
            let retail = catalog::convert_tiers(&collection.retail, &mut self.currency)?;
            let wholesale = catalog::convert_tiers(&collection.wholesale, &mut self.currency)?;
            let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

            self.collections
                .insert(key, TierTable::new(retail, wholesale, currency)?);
        }

        for (key, product) in fixture.products {
            let pricing = match &product.collection {
                Some(collection_key) => Some(
                    self.collections
                        .get(collection_key)
                        .ok_or_else(|| FixtureError::CollectionNotFound(collection_key.clone()))?
                        .clone(),
                ),
                None => None,
            };

            self.products.insert(
                key,
                ProductSnapshot {
                    product: Uuid::new_v4(),
                    name: product.name,
                    variations: product.variations,
                    stock: product.stock,
                    pricing,
                },
            );
        }

        Ok(self)
    }

    /// Load a complete fixture set by name
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_catalog(name)?;

        Ok(fixture)
    }

    /// Get a product snapshot by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&ProductSnapshot<'static>, FixtureError> {
        self.products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Iterate over all product snapshots with their string keys
    pub fn products(&self) -> impl Iterator<Item = (&str, &ProductSnapshot<'static>)> {
        self.products.iter().map(|(key, snapshot)| (key.as_str(), snapshot))
    }

    /// Get a collection's tier table by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is not found.
    pub fn collection(&self, key: &str) -> Result<&TierTable<'static>, FixtureError> {
        self.collections
            .get(key)
            .ok_or_else(|| FixtureError::CollectionNotFound(key.to_string()))
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no priced collection has been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Create an empty cart in the fixture currency for an audience
    ///
    /// # Errors
    ///
    /// Returns an error if no priced collection has been loaded yet.
    pub fn cart(&self, audience: PricingAudience) -> Result<Cart<'static>, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        Ok(Cart::new(currency, audience))
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rusty_money::iso::INR;
    use testresult::TestResult;

    use super::*;

    fn write_catalog(base: &Path, name: &str, contents: &str) -> TestResult {
        let dir = base.join("catalogs");

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn showroom_set_loads_collections_and_products() -> TestResult {
        let fixture = Fixture::from_set("showroom")?;

        assert_eq!(fixture.currency()?, INR);

        let ring = fixture.product("classic-band")?;

        assert_eq!(ring.name, "Classic Band Ring");
        assert_eq!(ring.stock, 40);
        assert!(ring.pricing.is_some());
        assert_eq!(ring.variations, vec!["Gold", "Rose Gold"]);

        Ok(())
    }

    #[test]
    fn product_without_collection_has_no_pricing() -> TestResult {
        let fixture = Fixture::from_set("showroom")?;

        let sample = fixture.product("loose-sample")?;

        assert!(sample.pricing.is_none());

        Ok(())
    }

    #[test]
    fn collection_without_wholesale_tiers_lists_na_for_wholesalers() -> TestResult {
        let fixture = Fixture::from_set("showroom")?;

        let bridal = fixture.collection("bridal-sets")?;

        assert!(bridal.display_price(PricingAudience::Retail).is_some());
        assert!(bridal.display_price(PricingAudience::Wholesaler).is_none());

        Ok(())
    }

    #[test]
    fn cart_uses_the_fixture_currency() -> TestResult {
        let fixture = Fixture::from_set("showroom")?;

        let cart = fixture.cart(PricingAudience::Retail)?;

        assert_eq!(cart.currency(), INR);
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn unknown_product_returns_error() -> TestResult {
        let fixture = Fixture::from_set("showroom")?;

        let result = fixture.product("nonexistent");

        assert!(matches!(result, Err(FixtureError::ProductNotFound(_))));

        Ok(())
    }

    #[test]
    fn no_catalog_loaded_means_no_currency() {
        let fixture = Fixture::new();

        assert!(matches!(fixture.currency(), Err(FixtureError::NoCurrency)));
        assert!(matches!(
            fixture.cart(PricingAudience::Retail),
            Err(FixtureError::NoCurrency)
        ));
    }

    #[test]
    fn undefined_collection_reference_is_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_catalog(
            dir.path(),
            "broken",
            "collections: {}\nproducts:\n  ring:\n    name: Ring\n    collection: missing\n    stock: 5\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture.load_catalog("broken");

        assert!(matches!(result, Err(FixtureError::CollectionNotFound(_))));

        Ok(())
    }

    #[test]
    fn mixed_currencies_in_one_set_are_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_catalog(
            dir.path(),
            "mixed",
            concat!(
                "collections:\n",
                "  rings:\n",
                "    retail:\n",
                "      - min: 0\n",
                "        price: \"100.00 USD\"\n",
                "    wholesale:\n",
                "      - min: 0\n",
                "        price: \"90.00 EUR\"\n",
                "products: {}\n",
            ),
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture.load_catalog("mixed");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }

    #[test]
    fn malformed_price_is_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_catalog(
            dir.path(),
            "garbled",
            concat!(
                "collections:\n",
                "  rings:\n",
                "    retail:\n",
                "      - min: 0\n",
                "        price: \"cheap\"\n",
                "products: {}\n",
            ),
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture.load_catalog("garbled");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));

        Ok(())
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let mut fixture = Fixture::with_base_path("./does-not-exist");
        let result = fixture.load_catalog("nope");

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }
}
