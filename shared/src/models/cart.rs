//! Cart Model (`tempOrders` collection)

use serde::{Deserialize, Serialize};

use super::topping::ToppingRef;

/// One cart line, persisted as its own document until checkout or removal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub food_id: String,
    pub food_name: String,
    pub food_price: f64,
    #[serde(default)]
    pub toppings: Vec<ToppingRef>,
    /// Owning customer id
    pub client_id: String,
    /// Unit price including toppings
    pub total_price: f64,
    #[serde(default)]
    pub instructions: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub created_at: i64,
}

fn default_quantity() -> u32 {
    1
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub food_id: String,
    /// Selected topping ids
    #[serde(default)]
    pub toppings: Vec<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    /// Defaults to 1
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Quantity edit for a single line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineUpdate {
    pub quantity: i64,
}

/// The caller's cart with its running subtotal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub subtotal: f64,
    pub item_count: u32,
}

/// Price preview request for the food dialog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToppingPreviewRequest {
    pub food_id: String,
    #[serde(default)]
    pub toppings: Vec<String>,
}

/// Price preview for a food with a topping selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToppingPreview {
    pub food_price: f64,
    pub toppings: Vec<ToppingRef>,
    pub toppings_total: f64,
    pub total_price: f64,
}
