//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{customer, order};
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Customer, Order};

fn not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::CustomerNotFound, format!("Customer {id} not found"))
}

/// GET /api/admin/customers - newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Customer>>> {
    Ok(Json(customer::find_all(&state.store)?))
}

/// GET /api/admin/customers/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Customer>> {
    let found = customer::find_by_id(&state.store, &id)?.ok_or_else(|| not_found(&id))?;
    Ok(Json(found))
}

/// GET /api/admin/customers/{id}/orders
pub async fn orders(State(state): State<ServerState>, Path(id): Path<String>) -> AppResult<Json<Vec<Order>>> {
    if customer::find_by_id(&state.store, &id)?.is_none() {
        return Err(not_found(&id));
    }
    Ok(Json(order::find_by_client(&state.store, &id)?))
}

/// PATCH /api/admin/customers/{id}/status - disabled customers cannot sign in
pub async fn toggle_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Customer>> {
    let updated = customer::toggle_status(&state.store, &id)?;
    security_log!(
        "INFO",
        "customer_status_changed",
        customer_id = id.as_str(),
        status = updated.status,
        operator = user.id.as_str()
    );
    Ok(Json(updated))
}
