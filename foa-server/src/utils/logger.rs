//! Logging Infrastructure
//!
//! Structured logging via `tracing`. `RUST_LOG` wins when set; otherwise the
//! configured level applies to this crate, `tower_http` and the `security` /
//! `http_access` targets.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Log file prefix inside the log directory
const LOG_FILE_PREFIX: &str = "foa-server";

/// Initialize the logger (stdout only, `info`)
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional daily-rolling file output
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&Path>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!(
            "foa_server={level},tower_http={level},security={level},http_access={level}"
        )));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    if let Some(dir) = log_dir
        && std::fs::create_dir_all(dir).is_ok()
    {
        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        if subscriber
            .with_ansi(false)
            .with_writer(file_appender)
            .try_init()
            .is_err()
        {
            eprintln!("logger already initialized");
        }
        return;
    }

    if subscriber.try_init().is_err() {
        eprintln!("logger already initialized");
    }
}
