//! Account Model (identity service)

use serde::{Deserialize, Serialize};

/// Which profile collection an account belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Customer,
    Staff,
}

/// Sign-in credentials. Stored server-side only, never returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account uid, referenced by the profile document's `uid`
    pub id: String,
    /// Lower-cased, unique
    pub email: String,
    pub password_hash: String,
    pub kind: AccountKind,
    pub created_at: i64,
}

/// Customer login / staff login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Password change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Successful login response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: SessionUser,
}

/// Identity of the signed-in user as seen by the clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Profile document id (customer id or staff id)
    pub id: String,
    pub uid: String,
    pub email: String,
    pub name: String,
    /// `customer`, `admin`, `super` or `deliveryGuy`
    pub role: String,
    pub permissions: Vec<String>,
}
