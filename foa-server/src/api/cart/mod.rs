//! Cart API (customer)
//!
//! Lines live in `tempOrders` until checkout; `/api/cart/stream` pushes the
//! cart again whenever it changes.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::view))
        .route("/stream", get(handler::stream))
        .route("/preview-toppings", post(handler::preview_toppings))
        .layer(middleware::from_fn(require_permission("cart:read")));

    let manage_routes = Router::new()
        .route("/", post(handler::add).delete(handler::clear))
        .route("/{id}", patch(handler::set_quantity).delete(handler::remove))
        .layer(middleware::from_fn(require_permission("cart:write")));

    read_routes.merge(manage_routes)
}
