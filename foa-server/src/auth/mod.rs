//! Authentication and authorization
//!
//! - [`JwtService`] - session tokens
//! - [`CurrentUser`] - authenticated caller
//! - [`require_auth`] / [`require_permission`] - middleware
//! - [`RateLimiter`] - login / sign-up throttling
//! - [`service`] - sign-up, login and password flows over the store

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod rate_limit;
pub mod service;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_permission};
pub use rate_limit::{RateLimiter, login_rate_limit, signup_rate_limit};
