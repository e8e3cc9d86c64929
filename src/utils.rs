//! Utils

use clap::Parser;

/// Arguments for the storefront demo
#[derive(Debug, Parser)]
pub struct DemoStorefrontArgs {
    /// Fixture set to load the catalog from
    #[clap(short, long, default_value = "showroom")]
    pub fixture: String,

    /// Role of the signed-in principal; resolves the pricing audience
    #[clap(short, long, default_value = "retail")]
    pub role: String,
}
