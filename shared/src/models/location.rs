//! Location Model (delivery zone)

use serde::{Deserialize, Serialize};

/// Delivery location (`location` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    /// Delivery fee
    pub price: f64,
    pub status: bool,
    pub created_at: i64,
}

/// Create location payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCreate {
    pub name: String,
    pub price: f64,
}

/// Update location payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
}
