//! Image Routes
//!
//! Upload needs a signed-in user; stored images are served publicly.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/image/upload", post(handler::upload))
        .route("/api/image/{filename}", get(handler::serve))
}
