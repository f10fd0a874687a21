//! Checkout API Handlers

use axum::{Json, extract::State};

use crate::auth::CurrentUser;
use crate::checkout;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{CheckoutRequest, CheckoutSession, ConfirmPaymentRequest, Order, PaymentSource, Quote};

/// POST /api/checkout/quote - totals for the current cart
pub async fn quote(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<Json<Quote>> {
    let quote = checkout::quote(&state.store, &user.id, req.order_type, req.location.as_deref())?;
    Ok(Json(quote))
}

/// POST /api/checkout/initialize - parameters for the payment popup
pub async fn initialize(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<Json<CheckoutSession>> {
    let session = checkout::initialize(
        &state.store,
        &user.id,
        &user.email,
        req,
        &state.config.currency,
        state.gateway.public_key(),
    )?;
    Ok(Json(session))
}

/// POST /api/checkout/confirm - after the popup reports success
///
/// Safe to repeat: a processed reference returns the order it created.
pub async fn confirm(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<ConfirmPaymentRequest>,
) -> AppResult<Json<Order>> {
    let order = checkout::complete_payment(
        &state.store,
        state.gateway.as_ref(),
        &state.config.currency,
        state.config.business_offset,
        req.reference.trim(),
        Some(&user.id),
        PaymentSource::Confirm,
    )
    .await?;
    Ok(Json(order))
}
