//! Customer self-service handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::analytics;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{customer, order};
use crate::messages;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    Customer, CustomerMessageCreate, CustomerUpdate, FoodTally, Message, OrderPage, UnreadCount,
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

fn validate_update(payload: &CustomerUpdate) -> AppResult<()> {
    if let Some(v) = &payload.first_name {
        validate_required_text(v, "firstName", MAX_NAME_LEN)?;
    }
    if let Some(v) = &payload.last_name {
        validate_required_text(v, "lastName", MAX_NAME_LEN)?;
    }
    if let Some(v) = &payload.contact {
        validate_required_text(v, "contact", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(v) = &payload.address {
        validate_required_text(v, "address", MAX_ADDRESS_LEN)?;
    }
    validate_optional_text(&payload.gender, "gender", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.image_url, "imageUrl", MAX_URL_LEN)?;
    Ok(())
}

/// GET /api/me
pub async fn profile(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Customer>> {
    let found = customer::find_by_id(&state.store, &user.id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound))?;
    Ok(Json(found))
}

/// PUT /api/me
pub async fn update_profile(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CustomerUpdate>,
) -> AppResult<Json<Customer>> {
    validate_update(&payload)?;
    let updated = customer::update(&state.store, &user.id, payload)?;
    tracing::info!(customer_id = %user.id, "Profile updated");
    Ok(Json(updated))
}

/// GET /api/me/orders?page=N - newest first, 10 per page
pub async fn orders(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<OrderPage>> {
    Ok(Json(order::page_for_client(&state.store, &user.id, query.page)?))
}

/// GET /api/me/top-foods
pub async fn top_foods(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<FoodTally>>> {
    Ok(Json(analytics::customer_top_foods(&state.store, &user.id)?))
}

/// POST /api/me/messages
pub async fn send_message(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<CustomerMessageCreate>,
) -> AppResult<Json<Message>> {
    Ok(Json(messages::send_from_customer(&state.store, &user.email, req)?))
}

/// GET /api/me/messages/inbox - marks the returned messages read
pub async fn inbox(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Message>>> {
    Ok(Json(messages::customer_inbox(&state.store, &user.email)?))
}

/// GET /api/me/messages/sent
pub async fn sent(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Message>>> {
    Ok(Json(messages::customer_sent(&state.store, &user.email)?))
}

/// GET /api/me/messages/unread
pub async fn unread(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<UnreadCount>> {
    let count = messages::unread_count(&state.store, &user.email)?;
    Ok(Json(UnreadCount { count }))
}
