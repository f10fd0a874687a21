//! Order Model (`orders` collection) and checkout payloads

use serde::{Deserialize, Serialize};

use super::cart::CartLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Delivery,
    Pickup,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Delivery => "delivery",
            OrderType::Pickup => "pickup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Received,
}

/// A placed order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Cart lines at the time of payment, with their quantities
    pub orders: Vec<CartLine>,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total_price: f64,
    pub order_type: OrderType,
    /// e.g. `25 July 2024 at 12:00:00 UTC+00:00`
    pub order_time: String,
    #[serde(default)]
    pub other_information: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_guy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed: Option<bool>,
    #[serde(default)]
    pub status: OrderStatus,
    pub payment_reference: String,
    pub created_at: i64,
}

/// Checkout parameters chosen in the cart dialog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub order_type: OrderType,
    /// Location id, required for delivery
    #[serde(default)]
    pub location: Option<String>,
    /// `HH:MM`, defaults to `12:00`
    #[serde(default)]
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub other_information: Option<String>,
}

/// Server-computed totals for the current cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub order_type: OrderType,
    pub location: Option<String>,
    pub lines: Vec<CartLine>,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total_price: f64,
    /// total × 100, as sent to the payment widget
    pub amount_minor: i64,
}

/// Everything the client needs to open the payment popup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub reference: String,
    pub amount_minor: i64,
    pub currency: String,
    pub email: String,
    pub public_key: String,
    pub quote: Quote,
}

/// Confirm payload sent after the widget's success callback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub reference: String,
}

/// Initialized but not yet paid checkout (`checkouts` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCheckout {
    pub reference: String,
    pub client_id: String,
    pub email: String,
    pub draft: CheckoutRequest,
    pub quote: Quote,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentSource {
    Confirm,
    Webhook,
}

/// Processed payment reference (`payments` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub reference: String,
    pub order_id: String,
    pub amount_minor: i64,
    pub processed_at: i64,
    pub source: PaymentSource,
}

/// Per-food order counter (`foodCounts` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodCount {
    pub food_id: String,
    pub count: u64,
}

/// Admin status toggle payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Admin order listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub order_type: Option<OrderType>,
    pub status: Option<OrderStatus>,
}

/// One page of a customer's order history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickup_order_omits_delivery_fields() {
        let order = Order {
            id: "o1".into(),
            orders: vec![],
            subtotal: 30.0,
            delivery_fee: 0.0,
            total_price: 30.0,
            order_type: OrderType::Pickup,
            order_time: "25 July 2024 at 12:00:00 UTC+00:00".into(),
            other_information: String::new(),
            client_id: "c1".into(),
            location: None,
            delivery_guy: None,
            token: Some("Ab3dE6gH".into()),
            claimed: Some(false),
            status: OrderStatus::Pending,
            payment_reference: "FOA-1".into(),
            created_at: 0,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["orderType"], "pickup");
        assert_eq!(json["claimed"], false);
        assert!(json.get("deliveryGuy").is_none());
        assert!(json.get("location").is_none());
    }
}
