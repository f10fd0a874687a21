//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State};

use crate::auth::{CurrentUser, service};
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{
    ChangePasswordRequest, Customer, CustomerSignup, LoginRequest, LoginResponse, SessionUser,
};

/// Fixed delay before answering a login, success or not
const AUTH_FIXED_DELAY_MS: u64 = 300;

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerSignup>,
) -> AppResult<Json<Customer>> {
    let profile = service::signup(&state.store, payload)?;
    Ok(Json(profile))
}

/// POST /api/auth/login - customer app
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let result = service::authenticate_customer(&state.store, &req);
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;
    let user = result?;
    Ok(Json(service::issue_token(&state.jwt_service, user)?))
}

/// POST /api/auth/staff/login - dashboard
pub async fn staff_login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let result = service::authenticate_staff(&state.store, &req, &state.config.dashboard_roles);
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;
    let user = result?;
    Ok(Json(service::issue_token(&state.jwt_service, user)?))
}

/// GET /api/auth/me
pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<SessionUser>> {
    Ok(Json(service::current_session(&state.store, &user)?))
}

/// POST /api/auth/password
pub async fn change_password(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<bool>> {
    service::change_password(&state.store, &user.uid, req)?;
    Ok(Json(true))
}
