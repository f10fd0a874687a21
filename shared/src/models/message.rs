//! Message Model (`complaints` / `tempComplaints` collections)

use serde::{Deserialize, Serialize};

/// Who wrote the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageMode {
    SentByCustomer,
    SentByAdmin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub subject: String,
    pub content: String,
    /// Unix millis
    pub date: i64,
    pub mode: MessageMode,
    /// Sender email for customer messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Recipient emails for staff messages
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub customer_ids: Vec<String>,
    #[serde(default)]
    pub is_read: bool,
}

/// Customer → staff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerMessageCreate {
    pub subject: String,
    pub content: String,
}

/// Staff → selected customers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMessageCreate {
    pub subject: String,
    pub content: String,
    pub customer_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: usize,
}
