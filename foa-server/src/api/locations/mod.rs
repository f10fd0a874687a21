//! Location API
//!
//! Customers pick a delivery zone from `/api/locations/active`; staff manage
//! zones under `/api/admin/locations`.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/locations/active", get(handler::list_active))
        .nest("/api/admin/locations", admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/delivery-guys", get(handler::delivery_guys))
        .layer(middleware::from_fn(require_permission("locations:read")));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/status", patch(handler::toggle_status))
        .layer(middleware::from_fn(require_permission("locations:write")));

    read_routes.merge(manage_routes)
}
