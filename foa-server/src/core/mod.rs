//! Core module: configuration, server state and lifecycle
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - shared handles passed to every handler
//! - [`Server`] - HTTP listener and background tasks
//! - [`ServerError`] - startup failures

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
