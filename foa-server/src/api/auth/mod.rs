//! Authentication Routes
//!
//! - `POST /api/auth/signup`: public, 3/min per IP
//! - `POST /api/auth/login`, `POST /api/auth/staff/login`: public, 5/min per IP
//! - `GET /api/auth/me`, `POST /api/auth/password`: any signed-in user

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::{login_rate_limit, signup_rate_limit};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let signup = Router::new()
        .route("/api/auth/signup", post(handler::signup))
        .layer(middleware::from_fn_with_state(state.clone(), signup_rate_limit));

    let login = Router::new()
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/staff/login", post(handler::staff_login))
        .layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    Router::new()
        .merge(signup)
        .merge(login)
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/password", post(handler::change_password))
}
