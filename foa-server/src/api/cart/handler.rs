//! Cart API Handlers

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, State},
    response::sse::{Event, Sse},
};
use futures::Stream;

use crate::api::live;
use crate::auth::CurrentUser;
use crate::cart;
use crate::core::ServerState;
use crate::db::Collection;
use crate::utils::AppResult;
use shared::models::{AddToCart, CartLine, CartLineUpdate, CartView, ToppingPreview, ToppingPreviewRequest};

/// GET /api/cart
pub async fn view(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<CartView>> {
    Ok(Json(cart::view(&state.store, &user.id)?))
}

/// GET /api/cart/stream - `cart` events carrying the full view
pub async fn stream(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let client_id = user.id;
    live::watch(state.store, Collection::TempOrders, "cart", move |store| {
        cart::view(store, &client_id)
    })
}

/// POST /api/cart/preview-toppings - price of a food with a topping selection
pub async fn preview_toppings(
    State(state): State<ServerState>,
    Json(req): Json<ToppingPreviewRequest>,
) -> AppResult<Json<ToppingPreview>> {
    Ok(Json(cart::preview_toppings(&state.store, &req)?))
}

/// POST /api/cart
pub async fn add(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<AddToCart>,
) -> AppResult<Json<CartLine>> {
    Ok(Json(cart::add_line(&state.store, &user.id, req)?))
}

/// PATCH /api/cart/{id}
pub async fn set_quantity(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<CartLineUpdate>,
) -> AppResult<Json<CartLine>> {
    Ok(Json(cart::set_quantity(&state.store, &user.id, &id, req.quantity)?))
}

/// DELETE /api/cart/{id}
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    cart::remove_line(&state.store, &user.id, &id)?;
    Ok(Json(true))
}

/// DELETE /api/cart - returns the number of removed lines
pub async fn clear(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<usize>> {
    Ok(Json(cart::clear(&state.store, &user.id)?))
}
