//! Order API Handlers

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::sse::{Event, Sse},
};
use futures::Stream;

use crate::api::live;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::Collection;
use crate::db::repository::order;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderQuery, OrderStatusUpdate};

/// GET /api/admin/orders?orderType=&status= - newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(order::find_all(&state.store, &query)?))
}

/// GET /api/admin/orders/stream - full order list on every change
pub async fn stream(State(state): State<ServerState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    live::watch(state.store, Collection::Orders, "orders", |store| {
        Ok(order::find_all(store, &OrderQuery::default())?)
    })
}

/// GET /api/admin/orders/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<String>) -> AppResult<Json<Order>> {
    let found = order::find_by_id(&state.store, &id)?.ok_or_else(|| {
        AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
    })?;
    Ok(Json(found))
}

/// PATCH /api/admin/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let updated = order::set_status(&state.store, &id, payload.status)?;
    tracing::info!(order_id = %id, status = ?updated.status, operator = %user.id, "Order status changed");
    Ok(Json(updated))
}

/// POST /api/admin/orders/{id}/claim - pickup orders only
pub async fn claim(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let updated = order::mark_claimed(&state.store, &id)?;
    tracing::info!(order_id = %id, operator = %user.id, "Pickup order claimed");
    Ok(Json(updated))
}
