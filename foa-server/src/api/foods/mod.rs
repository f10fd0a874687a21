//! Food API
//!
//! Public catalog reads under `/api/foods`, management under `/api/admin/foods`.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/foods", public_routes())
        .nest("/api/admin/foods", admin_routes())
}

fn public_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/toppings", get(handler::list_toppings))
}

fn admin_routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/counts", get(handler::counts))
        .layer(middleware::from_fn(require_permission("catalog:read")));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_permission("catalog:write")));

    read_routes.merge(manage_routes)
}
