//! Repository Module
//!
//! Per-collection CRUD and queries over the [`DocStore`](super::DocStore).
//! Functions are synchronous; redb transactions are short and handlers call
//! them directly.

// Identity
pub mod account;
pub mod customer;
pub mod staff;

// Catalog
pub mod category;
pub mod food;
pub mod location;
pub mod topping;

// Orders
pub mod cart;
pub mod order;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use super::store::StoreError;

/// Repository error types
///
/// Business failures carry the [`ErrorCode`] the API reports.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{1}")]
    NotFound(ErrorCode, String),

    #[error("{1}")]
    Duplicate(ErrorCode, String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("{1}")]
    Validation(ErrorCode, String),
}

impl From<StoreError> for RepoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { collection, id } => RepoError::Duplicate(
                ErrorCode::AlreadyExists,
                format!("{collection}/{id} already exists"),
            ),
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(code, msg)
            | RepoError::Duplicate(code, msg)
            | RepoError::Validation(code, msg) => AppError::with_message(code, msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database failure");
                AppError::database(msg)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Case-insensitive name comparison used by the uniqueness checks
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
