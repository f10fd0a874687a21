//! Customer API (dashboard)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin/customers", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/orders", get(handler::orders))
        .layer(middleware::from_fn(require_permission("customers:read")));

    let manage_routes = Router::new()
        .route("/{id}/status", patch(handler::toggle_status))
        .layer(middleware::from_fn(require_permission("customers:write")));

    read_routes.merge(manage_routes)
}
