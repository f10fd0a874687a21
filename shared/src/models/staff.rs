//! Staff Model

use serde::{Deserialize, Serialize};

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StaffRole {
    #[default]
    Admin,
    Super,
    DeliveryGuy,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Super => "super",
            StaffRole::DeliveryGuy => "deliveryGuy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(StaffRole::Admin),
            "super" => Some(StaffRole::Super),
            "deliveryGuy" => Some(StaffRole::DeliveryGuy),
            _ => None,
        }
    }
}

/// Staff member (`staff` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: String,
    pub uid: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub role: StaffRole,
    /// Location id, set for delivery guys only
    pub location: Option<String>,
    pub image: Option<String>,
    pub status: bool,
    pub created_at: i64,
}

/// Create staff payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffCreate {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    /// Defaults to `admin`
    #[serde(default)]
    pub role: Option<StaffRole>,
    pub location: Option<String>,
    pub image: Option<String>,
}

/// Update staff payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<StaffRole>,
    pub location: Option<String>,
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names() {
        assert_eq!(
            serde_json::to_string(&StaffRole::DeliveryGuy).unwrap(),
            "\"deliveryGuy\""
        );
        assert_eq!(StaffRole::parse("super"), Some(StaffRole::Super));
        assert_eq!(StaffRole::parse("owner"), None);
        assert_eq!(StaffRole::default().as_str(), "admin");
    }
}
