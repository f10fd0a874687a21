//! Location API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{location, staff};
use crate::money::validate_price;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Location, LocationCreate, LocationUpdate, Staff};

#[derive(Debug, Deserialize)]
pub struct LocationSearch {
    pub search: Option<String>,
}

fn not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::LocationNotFound, format!("Location {id} not found"))
}

/// GET /api/locations/active
pub async fn list_active(State(state): State<ServerState>) -> AppResult<Json<Vec<Location>>> {
    Ok(Json(location::find_active(&state.store)?))
}

/// GET /api/admin/locations?search=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<LocationSearch>,
) -> AppResult<Json<Vec<Location>>> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    Ok(Json(location::find_all(&state.store, search)?))
}

/// GET /api/admin/locations/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Location>> {
    let found = location::find_by_id(&state.store, &id)?.ok_or_else(|| not_found(&id))?;
    Ok(Json(found))
}

/// GET /api/admin/locations/{id}/delivery-guys - active riders for the zone
pub async fn delivery_guys(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Staff>>> {
    if location::find_by_id(&state.store, &id)?.is_none() {
        return Err(not_found(&id));
    }
    Ok(Json(staff::delivery_guys_at(&state.store, &id)?))
}

/// POST /api/admin/locations
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<LocationCreate>,
) -> AppResult<Json<Location>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_price(payload.price, "price")?;
    let created = location::create(&state.store, payload)?;
    tracing::info!(location_id = %created.id, name = %created.name, operator = %user.id, "Location created");
    Ok(Json(created))
}

/// PUT /api/admin/locations/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<LocationUpdate>,
) -> AppResult<Json<Location>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_price(price, "price")?;
    }
    let updated = location::update(&state.store, &id, payload)?;
    tracing::info!(location_id = %id, operator = %user.id, "Location updated");
    Ok(Json(updated))
}

/// PATCH /api/admin/locations/{id}/status
pub async fn toggle_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Location>> {
    let updated = location::toggle_status(&state.store, &id)?;
    tracing::info!(location_id = %id, status = updated.status, operator = %user.id, "Location status toggled");
    Ok(Json(updated))
}

/// DELETE /api/admin/locations/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let deleted = location::delete(&state.store, &id)?;
    if deleted {
        tracing::info!(location_id = %id, operator = %user.id, "Location deleted");
    }
    Ok(Json(deleted))
}
