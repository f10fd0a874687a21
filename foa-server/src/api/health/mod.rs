//! Health check route
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /health | GET | none |

use std::sync::OnceLock;
use std::time::Instant;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::Collection;

static START_TIME: OnceLock<Instant> = OnceLock::new();

pub fn router() -> Router<ServerState> {
    START_TIME.get_or_init(Instant::now);
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    database: &'static str,
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let database = match state.store.count(Collection::Foods) {
        Ok(_) => "ok",
        Err(e) => {
            tracing::error!(error = %e, "Health check: store unreadable");
            "error"
        }
    };
    Json(HealthResponse {
        status: if database == "ok" { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: START_TIME.get_or_init(Instant::now).elapsed().as_secs(),
        database,
    })
}
