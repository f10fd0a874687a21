//! Export API (dashboard)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin/exports", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders/{format}", get(handler::orders))
        .route("/customers/{format}", get(handler::customers))
        .layer(middleware::from_fn(require_permission("exports:read")))
}
