//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.
//! `RUST_LOG` takes precedence over the configured level when set.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// File name prefix for the daily rolling log
const LOG_FILE_PREFIX: &str = "shelf-admin";

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None, None);
}

/// Initialize the logger with optional JSON lines and file output
///
/// Calling it a second time is a no-op.
pub fn init_logger_with_file(log_level: Option<&str>, json: Option<bool>, log_dir: Option<&str>) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(log_level))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    // Add file output if log_dir exists
    let dir = log_dir
        .map(Path::new)
        .filter(|p| p.exists())
        .and_then(|p| p.to_str());

    let result = match (dir, json.unwrap_or(false)) {
        (Some(dir), true) => builder
            .json()
            .with_writer(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
            .try_init(),
        (Some(dir), false) => builder
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
            .try_init(),
        (None, true) => builder.json().try_init(),
        (None, false) => builder.try_init(),
    };

    if result.is_err() {
        tracing::debug!("Logger already initialized");
    }
}

/// Build the level filter, preferring `RUST_LOG`
fn build_filter(log_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_directive(log_level)))
}

/// Normalize a configured level, falling back to `info`
fn level_directive(log_level: Option<&str>) -> String {
    log_level
        .map(|l| l.trim().to_lowercase())
        .filter(|l| l.parse::<tracing::Level>().is_ok())
        .unwrap_or_else(|| "info".to_string())
}
