use serde::{Deserialize, Serialize};
use sqlx::types::Decimal;

use crate::catalog::dto::ProductSummary;

/// One enriched cart line: the stored snapshot joined with the live catalog
/// row it refers to.
#[derive(Debug, Serialize)]
pub struct CartLine {
    pub product: ProductSummary,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total_price: Decimal,
    pub count: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub override_quantity: bool,
    #[serde(default)]
    pub redirect_to_cart: bool,
}

fn default_quantity() -> u32 {
    1
}

/// Where the client should go after an add, mirroring the storefront's
/// redirect choice.
#[derive(Debug, Serialize)]
pub struct AddToCartResponse {
    pub message: String,
    pub cart_count: u32,
    pub next: String,
}

#[derive(Debug, Serialize)]
pub struct RemoveFromCartResponse {
    pub message: String,
    pub cart_count: u32,
}
