//! Customer self-service API
//!
//! Profile, order history, favourite foods and the support inbox of the
//! signed-in customer.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/me", routes())
}

fn routes() -> Router<ServerState> {
    let profile_routes = Router::new()
        .route("/", get(handler::profile).put(handler::update_profile))
        .layer(middleware::from_fn(require_permission("profile:own")));

    let order_routes = Router::new()
        .route("/orders", get(handler::orders))
        .route("/top-foods", get(handler::top_foods))
        .layer(middleware::from_fn(require_permission("orders:own")));

    let message_routes = Router::new()
        .route("/messages", post(handler::send_message))
        .route("/messages/inbox", get(handler::inbox))
        .route("/messages/sent", get(handler::sent))
        .route("/messages/unread", get(handler::unread))
        .layer(middleware::from_fn(require_permission("messages:own")));

    profile_routes.merge(order_routes).merge(message_routes)
}
