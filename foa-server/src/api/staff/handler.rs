//! Staff API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::{CurrentUser, service};
use crate::core::ServerState;
use crate::db::repository::staff;
use crate::security_log;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Staff, StaffCreate, StaffRole, StaffUpdate};

#[derive(Debug, Deserialize)]
pub struct StaffFilter {
    /// `admin`, `super` or `deliveryGuy`
    pub role: Option<String>,
}

fn validate_update(payload: &StaffUpdate) -> AppResult<()> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(phone) = &payload.phone {
        validate_required_text(phone, "phone", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(address) = &payload.address {
        validate_required_text(address, "address", MAX_ADDRESS_LEN)?;
    }
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    Ok(())
}

/// GET /api/admin/staff?role=
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<StaffFilter>,
) -> AppResult<Json<Vec<Staff>>> {
    let role = match filter.role.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(StaffRole::parse(raw).ok_or_else(|| {
            AppError::with_message(ErrorCode::InvalidRequest, format!("Unknown staff role: {raw}"))
        })?),
    };
    Ok(Json(staff::find_all(&state.store, role)?))
}

/// GET /api/admin/staff/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<String>) -> AppResult<Json<Staff>> {
    let found = staff::find_by_id(&state.store, &id)?.ok_or_else(|| {
        AppError::with_message(ErrorCode::StaffNotFound, format!("Staff {id} not found"))
    })?;
    Ok(Json(found))
}

/// POST /api/admin/staff - account gets the configured default password
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<StaffCreate>,
) -> AppResult<Json<Staff>> {
    let created = service::create_staff(&state.store, payload, &state.config.staff_default_password)?;
    security_log!(
        "INFO",
        "staff_created",
        staff_id = created.id.as_str(),
        role = created.role.as_str(),
        operator = user.id.as_str()
    );
    Ok(Json(created))
}

/// PUT /api/admin/staff/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<StaffUpdate>,
) -> AppResult<Json<Staff>> {
    validate_update(&payload)?;
    let updated = staff::update(&state.store, &id, payload)?;
    tracing::info!(staff_id = %id, operator = %user.id, "Staff updated");
    Ok(Json(updated))
}

/// PATCH /api/admin/staff/{id}/status
pub async fn toggle_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Staff>> {
    if id == user.id {
        return Err(AppError::with_message(
            ErrorCode::StaffCannotDeleteSelf,
            "You cannot disable your own account",
        ));
    }
    let updated = staff::toggle_status(&state.store, &id)?;
    security_log!(
        "INFO",
        "staff_status_changed",
        staff_id = id.as_str(),
        status = updated.status,
        operator = user.id.as_str()
    );
    Ok(Json(updated))
}

/// DELETE /api/admin/staff/{id} - removes the sign-in account too
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Staff>> {
    if id == user.id {
        return Err(AppError::new(ErrorCode::StaffCannotDeleteSelf));
    }
    let removed = staff::delete(&state.store, &id)?;
    security_log!("INFO", "staff_deleted", staff_id = id.as_str(), operator = user.id.as_str());
    Ok(Json(removed))
}
