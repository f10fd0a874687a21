//! Payment provider integration
//!
//! [`PaymentGateway`] is the seam between checkout and the provider:
//! production uses [`PaystackGateway`], tests plug in a scripted gateway.

pub mod paystack;
pub mod webhook;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

pub use paystack::PaystackGateway;

/// Reference prefix for checkouts created by this server
pub const REFERENCE_PREFIX: &str = "FOA-";

/// Outcome of a transaction lookup at the provider
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub reference: String,
    /// Provider status, `success` when paid
    pub status: String,
    pub amount_minor: i64,
    pub currency: String,
}

impl Verification {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment provider rejected the request: {0}")]
    Provider(String),

    #[error("Unexpected payment provider response: {0}")]
    Decode(String),

    #[error("Invalid payment reference")]
    InvalidReference,
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidReference => {
                AppError::with_message(ErrorCode::CheckoutNotFound, err.to_string())
            }
            PaymentError::Http(ref e) if e.is_timeout() => {
                tracing::warn!(error = %err, "Payment provider timed out");
                AppError::with_message(ErrorCode::TimeoutError, "Payment provider timed out")
            }
            other => {
                tracing::error!(error = %other, "Payment provider failure");
                AppError::with_message(ErrorCode::PaymentProviderError, other.to_string())
            }
        }
    }
}

/// Transaction verification at the payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Look up a transaction by reference
    async fn verify(&self, reference: &str) -> Result<Verification, PaymentError>;

    /// Key handed to the client-side checkout widget
    fn public_key(&self) -> &str;
}

/// Fresh checkout reference
pub fn new_reference() -> String {
    format!("{REFERENCE_PREFIX}{}", uuid::Uuid::new_v4())
}

/// References are URL path segments at the provider
pub fn is_valid_reference(reference: &str) -> bool {
    !reference.is_empty()
        && reference.len() <= 100
        && reference
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'='))
}
