//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::category;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Category, CategoryCreate, CategoryUpdate};

/// GET /api/categories
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(category::find_all(&state.store)?))
}

/// GET /api/admin/categories/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Category>> {
    let found = category::find_by_id(&state.store, &id)?.ok_or_else(|| {
        AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
    })?;
    Ok(Json(found))
}

/// POST /api/admin/categories
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    let created = category::create(&state.store, payload)?;
    tracing::info!(category_id = %created.id, name = %created.name, operator = %user.id, "Category created");
    Ok(Json(created))
}

/// PUT /api/admin/categories/{id} - renames carry over to foods
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    let updated = category::update(&state.store, &id, payload)?;
    tracing::info!(category_id = %id, operator = %user.id, "Category updated");
    Ok(Json(updated))
}

/// DELETE /api/admin/categories/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let deleted = category::delete(&state.store, &id)?;
    if deleted {
        tracing::info!(category_id = %id, operator = %user.id, "Category deleted");
    }
    Ok(Json(deleted))
}
