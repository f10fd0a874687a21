//! Paystack webhook handler
//!
//! The signature is checked over the raw body before anything is parsed.
//! `charge.success` goes through the same completion path as client
//! confirmation, so a payment already turned into an order is acknowledged
//! without writing again.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde::Serialize;

use crate::checkout;
use crate::core::ServerState;
use crate::payment::webhook::{CHARGE_SUCCESS, SIGNATURE_HEADER, WebhookEvent, verify_signature};
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::PaymentSource;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// POST /api/payments/paystack/webhook
pub async fn paystack_webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            security_log!("WARN", "webhook_signature_missing", bytes = body.len());
            AppError::new(ErrorCode::PaymentSignatureInvalid)
        })?;

    if let Err(reason) = verify_signature(&body, signature, &state.config.paystack_secret_key) {
        security_log!("WARN", "webhook_signature_invalid", reason = reason);
        return Err(AppError::new(ErrorCode::PaymentSignatureInvalid));
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid webhook payload: {e}")))?;

    if event.event != CHARGE_SUCCESS {
        tracing::debug!(event = %event.event, "Ignoring webhook event");
        return Ok(Json(WebhookAck {
            received: true,
            order_id: None,
        }));
    }

    let reference = event
        .reference()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::with_message(ErrorCode::RequiredField, "Webhook event has no reference"))?;

    let order = checkout::complete_payment(
        &state.store,
        state.gateway.as_ref(),
        &state.config.currency,
        state.config.business_offset,
        reference,
        None,
        PaymentSource::Webhook,
    )
    .await?;

    tracing::info!(reference = %reference, order_id = %order.id, "Webhook payment settled");
    Ok(Json(WebhookAck {
        received: true,
        order_id: Some(order.id),
    }))
}
