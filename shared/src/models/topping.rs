//! Topping Model

use serde::{Deserialize, Serialize};

/// Topping entity (`toppings` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topping {
    pub id: String,
    pub name: String,
    pub price: f64,
    /// Ids of the foods this topping applies to
    #[serde(default)]
    pub foods: Vec<String>,
    pub created_at: i64,
}

impl Topping {
    pub fn applies_to(&self, food_id: &str) -> bool {
        self.foods.iter().any(|f| f == food_id)
    }
}

/// Topping snapshot embedded in a cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToppingRef {
    pub id: String,
    pub name: String,
    pub price: f64,
}

impl From<&Topping> for ToppingRef {
    fn from(t: &Topping) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            price: t.price,
        }
    }
}

/// Create topping payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToppingCreate {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub foods: Vec<String>,
}

/// Update topping payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToppingUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub foods: Option<Vec<String>>,
}
