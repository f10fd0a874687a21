//! Dashboard analytics DTOs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One dashboard widget (`CUSTOMERS`, `TOTAL REVENUE`, `ORDERS`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub title: String,
    pub value: f64,
    pub current_year: f64,
    /// Current-year share of the total, 2 decimals
    pub percentage: f64,
}

/// Summed quantity for one food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodTally {
    pub food_id: String,
    pub food_name: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueRow {
    /// `DELIVERY` or `PICKUP`
    pub label: String,
    pub orders: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub rows: Vec<RevenueRow>,
    pub subtotal: f64,
    pub tax_rate: f64,
    pub taxes: f64,
    pub total: f64,
}

/// Quantities per food name for one month
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyFoodOrders {
    /// `Jan` .. `Dec`
    pub month: String,
    pub foods: BTreeMap<String, u64>,
}
