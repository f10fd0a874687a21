//! Food Model

use serde::{Deserialize, Serialize};

/// Food entity (`foods` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub ratings: f64,
    /// Category names
    #[serde(default)]
    pub categories: Vec<String>,
    pub image: Option<String>,
    pub created_at: i64,
}

/// Create food payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCreate {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub categories: Vec<String>,
    pub image: Option<String>,
}

/// Update food payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub ratings: Option<f64>,
    pub categories: Option<Vec<String>>,
    pub image: Option<String>,
}

/// Catalog listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodQuery {
    /// Case-insensitive name substring
    pub search: Option<String>,
    /// Category name
    pub category: Option<String>,
}
