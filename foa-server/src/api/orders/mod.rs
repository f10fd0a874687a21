//! Order API (dashboard)
//!
//! Placed orders are immutable apart from the status toggle and the pickup
//! `claimed` flag.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin/orders", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/stream", get(handler::stream))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission("orders:read")));

    let manage_routes = Router::new()
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/claim", post(handler::claim))
        .layer(middleware::from_fn(require_permission("orders:write")));

    read_routes.merge(manage_routes)
}
