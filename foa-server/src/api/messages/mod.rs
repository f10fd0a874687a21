//! Support messages API (dashboard)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin/messages", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/inbox", get(handler::inbox))
        .route("/sent", get(handler::sent))
        .layer(middleware::from_fn(require_permission("messages:read")));

    let manage_routes = Router::new()
        .route("/", post(handler::send))
        .route("/{id}/read", patch(handler::mark_read))
        .layer(middleware::from_fn(require_permission("messages:write")));

    read_routes.merge(manage_routes)
}
