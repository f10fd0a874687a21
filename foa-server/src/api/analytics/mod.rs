//! Dashboard analytics API

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin/analytics", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/widgets", get(handler::widgets))
        .route("/most-purchased", get(handler::most_purchased))
        .route("/revenue", get(handler::revenue))
        .route("/monthly", get(handler::monthly))
        .route("/customers/{id}/top-foods", get(handler::customer_top_foods))
        .layer(middleware::from_fn(require_permission("analytics:read")))
}
