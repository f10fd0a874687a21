//! FOA server: food ordering backend for the customer app and the staff dashboard
//!
//! # Module layout
//!
//! ```text
//! foa-server/src/
//! ├── core/        # config, state, server lifecycle
//! ├── auth/        # JWT sessions, permissions, rate limiting, identity flows
//! ├── db/          # redb document store and repositories
//! ├── api/         # HTTP routers and handlers
//! ├── cart.rs      # cart lines and pricing
//! ├── checkout.rs  # quotes, pending checkouts, atomic order commit
//! ├── payment/     # Paystack verification and webhooks
//! ├── messages.rs  # customer / staff messaging
//! ├── analytics.rs # dashboard numbers
//! ├── export/      # XLSX and PDF exports
//! ├── images.rs    # uploaded images
//! ├── money.rs     # decimal money helpers
//! └── utils/       # logging, validation, time
//! ```

pub mod analytics;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod core;
pub mod db;
pub mod export;
pub mod images;
pub mod messages;
pub mod money;
pub mod payment;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Security event log line (target `security`)
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Create the work directory and start logging (files only outside development)
pub fn setup_environment(config: &Config) -> std::io::Result<()> {
    std::fs::create_dir_all(&config.work_dir)?;
    let log_dir = config.logs_dir();
    init_logger_with_file(
        Some(&config.log_level),
        (!config.is_development()).then_some(log_dir.as_path()),
    );
    Ok(())
}
