//! Shared types for the FOA food-ordering platform
//!
//! Used by the server and mirrored by both web clients (customer app and
//! staff dashboard): the unified error system and the document/wire models.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
