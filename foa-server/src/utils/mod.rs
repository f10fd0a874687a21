//! Utility module
//!
//! - [`logger`] - tracing subscriber setup
//! - [`validation`] - input length / format checks shared by handlers
//! - [`time`] - business-offset date helpers and order-time formatting

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
