//! Topping API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::topping;
use crate::money::validate_price;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Topping, ToppingCreate, ToppingUpdate};

fn validate_create(payload: &ToppingCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_price(payload.price, "price")?;
    Ok(())
}

fn validate_update(payload: &ToppingUpdate) -> AppResult<()> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_price(price, "price")?;
    }
    Ok(())
}

/// GET /api/admin/toppings
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Topping>>> {
    Ok(Json(topping::find_all(&state.store)?))
}

/// GET /api/admin/toppings/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Topping>> {
    let found = topping::find_by_id(&state.store, &id)?.ok_or_else(|| {
        AppError::with_message(ErrorCode::ToppingNotFound, format!("Topping {id} not found"))
    })?;
    Ok(Json(found))
}

/// POST /api/admin/toppings
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ToppingCreate>,
) -> AppResult<Json<Topping>> {
    validate_create(&payload)?;
    let created = topping::create(&state.store, payload)?;
    tracing::info!(topping_id = %created.id, foods = created.foods.len(), operator = %user.id, "Topping created");
    Ok(Json(created))
}

/// PUT /api/admin/toppings/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ToppingUpdate>,
) -> AppResult<Json<Topping>> {
    validate_update(&payload)?;
    let updated = topping::update(&state.store, &id, payload)?;
    tracing::info!(topping_id = %id, operator = %user.id, "Topping updated");
    Ok(Json(updated))
}

/// DELETE /api/admin/toppings/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let deleted = topping::delete(&state.store, &id)?;
    if deleted {
        tracing::info!(topping_id = %id, operator = %user.id, "Topping deleted");
    }
    Ok(Json(deleted))
}
