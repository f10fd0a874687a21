//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer profile (`customers` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact: String,
    pub address: String,
    pub gender: Option<String>,
    pub image_url: Option<String>,
    /// Location id; the customer export shows its name
    #[serde(default)]
    pub location: Option<String>,
    /// `false` blocks login
    pub status: bool,
    pub created_at: i64,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Sign-up payload: creates the account and the profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSignup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub contact: String,
    pub address: String,
    pub gender: Option<String>,
    pub image_url: Option<String>,
}

/// Profile update by the customer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
}
