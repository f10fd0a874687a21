//! Checkout API (customer)
//!
//! Two phases: `initialize` parks the quoted cart under a payment reference,
//! `confirm` verifies the payment with the provider and commits the order.
//! The Paystack webhook finishes the same checkout if the client never calls
//! `confirm`.

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/checkout",
        Router::new()
            .route("/quote", post(handler::quote))
            .route("/initialize", post(handler::initialize))
            .route("/confirm", post(handler::confirm))
            .layer(middleware::from_fn(require_permission("orders:own"))),
    )
}
