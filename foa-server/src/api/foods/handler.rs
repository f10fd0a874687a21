//! Food API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{food, topping};
use crate::money::validate_price;
use crate::utils::validation::{MAX_NAME_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Food, FoodCount, FoodCreate, FoodQuery, FoodUpdate, Topping};

fn validate_categories(categories: &[String]) -> AppResult<()> {
    for name in categories {
        validate_required_text(name, "categories", MAX_NAME_LEN)?;
    }
    Ok(())
}

fn validate_create(payload: &FoodCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_price(payload.price, "price")?;
    validate_categories(&payload.categories)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    Ok(())
}

fn validate_update(payload: &FoodUpdate) -> AppResult<()> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_price(price, "price")?;
    }
    if let Some(ratings) = payload.ratings
        && !(0.0..=5.0).contains(&ratings)
    {
        return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "ratings must be between 0 and 5")
            .with_detail("field", "ratings"));
    }
    if let Some(categories) = &payload.categories {
        validate_categories(categories)?;
    }
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    Ok(())
}

/// GET /api/foods?search=&category=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<FoodQuery>,
) -> AppResult<Json<Vec<Food>>> {
    Ok(Json(food::find_all(&state.store, &query)?))
}

/// GET /api/foods/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<String>) -> AppResult<Json<Food>> {
    let found = food::find_by_id(&state.store, &id)?.ok_or_else(|| {
        AppError::with_message(ErrorCode::FoodNotFound, format!("Food {id} not found"))
    })?;
    Ok(Json(found))
}

/// GET /api/foods/{id}/toppings
pub async fn list_toppings(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Topping>>> {
    Ok(Json(topping::find_for_food(&state.store, &id)?))
}

/// GET /api/admin/foods/counts - times each food was ordered
pub async fn counts(State(state): State<ServerState>) -> AppResult<Json<Vec<FoodCount>>> {
    Ok(Json(food::counts(&state.store)?))
}

/// POST /api/admin/foods
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<FoodCreate>,
) -> AppResult<Json<Food>> {
    validate_create(&payload)?;
    let created = food::create(&state.store, payload)?;
    tracing::info!(food_id = %created.id, operator = %user.id, "Food created");
    Ok(Json(created))
}

/// PUT /api/admin/foods/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<FoodUpdate>,
) -> AppResult<Json<Food>> {
    validate_update(&payload)?;
    let updated = food::update(&state.store, &id, payload)?;
    tracing::info!(food_id = %id, operator = %user.id, "Food updated");
    Ok(Json(updated))
}

/// DELETE /api/admin/foods/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let deleted = food::delete(&state.store, &id)?;
    if deleted {
        tracing::info!(food_id = %id, operator = %user.id, "Food deleted");
    }
    Ok(Json(deleted))
}
