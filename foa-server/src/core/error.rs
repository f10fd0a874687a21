use thiserror::Error;

use crate::db::StoreError;
use crate::export::ExportError;
use crate::payment::PaymentError;
use shared::error::AppError;

/// Startup and lifecycle failures
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Storage initialization failed: {0}")]
    Store(#[from] StoreError),

    #[error("Payment gateway initialization failed: {0}")]
    Payment(#[from] PaymentError),

    #[error("Export font could not be loaded: {0}")]
    Export(#[from] ExportError),

    #[error("Bootstrap failed: {0}")]
    Bootstrap(#[from] AppError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
