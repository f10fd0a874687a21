//! Payment provider callbacks

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/payments/paystack/webhook", post(handler::paystack_webhook))
}
