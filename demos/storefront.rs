//! Storefront Demo
//!
//! Plays an offline point-of-sale billing session against a fixture catalog:
//! the listing sorted by display price, a cart session with pooled
//! repricing, and a checkout committed to in-process collaborators.
//!
//! Use `-f` to load a fixture set by name
//! Use `-r` to set the signed-in role (`retail` or `wholesaler`)

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use karat::{
    cart::{Cart, LineKey},
    catalog::PricingAudience,
    checkout::{BuyerInfo, Checkout, ExternalError, NewOrder, OrderSink, StockWriter},
    fixtures::Fixture,
    notify::{NotifyConfig, OrderNotifier},
    utils::DemoStorefrontArgs,
};
use uuid::Uuid;

/// Order sink that prints the payload it would persist.
#[derive(Debug)]
struct PrintlnSink;

#[expect(clippy::print_stdout, reason = "Example code")]
#[async_trait]
impl OrderSink for PrintlnSink {
    async fn create_order(&self, order: NewOrder) -> Result<String, ExternalError> {
        println!("order payload:\n{}", serde_json::to_string_pretty(&order)?);

        Ok(format!("ord_{}", Uuid::new_v4().simple()))
    }
}

/// Stock writer that prints the overwrites it would perform.
#[derive(Debug)]
struct PrintlnStock;

#[expect(clippy::print_stdout, reason = "Example code")]
#[async_trait]
impl StockWriter for PrintlnStock {
    async fn write_stock(&self, product: Uuid, quantity: u32) -> Result<(), ExternalError> {
        println!("stock[{product}] <- {quantity}");

        Ok(())
    }
}

/// Storefront Demo
#[expect(clippy::print_stdout, reason = "Example code")]
#[tokio::main]
async fn main() -> Result<()> {
    let _env = dotenvy::dotenv();

    let args = DemoStorefrontArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let audience = PricingAudience::from_role(&args.role);

    println!("listing ({audience}):");

    let mut listing: Vec<_> = fixture.products().collect();

    listing.sort_by_key(|(_, snapshot)| {
        snapshot
            .pricing
            .as_ref()
            .and_then(|table| table.display_price(audience))
            .map_or(i64::MAX, |price| price.to_minor_units())
    });

    for (key, snapshot) in &listing {
        let price = snapshot
            .pricing
            .as_ref()
            .and_then(|table| table.display_price(audience));

        match price {
            Some(price) => println!("  {key:<14} {:<20} {price}", snapshot.name),
            None => println!("  {key:<14} {:<20} N/A", snapshot.name),
        }
    }

    let mut cart = fixture.cart(audience)?;

    let band = fixture.product("classic-band")?;
    let chain = fixture.product("curb-chain")?;

    for _ in 0..6 {
        cart.add_line(band, Some("Gold"))?;
    }

    for _ in 0..5 {
        cart.add_line(chain, None)?;
    }

    print_cart(&cart);

    println!("\nremoving one Curb Chain:");
    cart.remove_line(&LineKey::new(chain.product, None));
    print_cart(&cart);

    let checkout = Checkout::new(PrintlnSink, PrintlnStock);
    let total = cart.total();

    let order_id = checkout
        .commit(
            &mut cart,
            BuyerInfo {
                name: "Walk-in customer".to_owned(),
                phone: "+91 98000 00000".to_owned(),
                address: None,
            },
        )
        .await?;

    println!("\ncommitted order {order_id}");

    // Announce the order when messaging credentials are configured.
    if let Ok(config) = NotifyConfig::from_env() {
        OrderNotifier::new(config).order_created(&order_id, &total).await;
    }

    Ok(())
}

#[expect(clippy::print_stdout, reason = "Example code")]
fn print_cart(cart: &Cart<'_>) {
    println!("\ncart ({} lines):", cart.len());

    for (_, line) in cart.iter() {
        let variation = line
            .variation()
            .map_or_else(String::new, |v| format!(" ({v})"));

        println!(
            "  {}{variation} x{} @ {} = {}",
            line.name(),
            line.quantity(),
            line.unit_price(),
            line.line_total()
        );
    }

    println!("  total: {}", cart.total());
}
