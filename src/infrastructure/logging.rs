//! Centralized file-based logging system
//!
//! Writes logs under the configured directory, separated by log type:
//! - main/ - all events, JSON lines
//! - error/ - warnings and errors only
//! - exchange/ - market loading and ticker fetches
//!
//! Plus an optional console layer.

use super::config::LoggingConfig;
use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_TYPES: [&str; 3] = ["main", "error", "exchange"];

/// Initialize file logging
///
/// Returns the appender guards; keep them alive for the whole program or
/// buffered lines are lost.
pub fn init_logging(config: &LoggingConfig) -> io::Result<Vec<WorkerGuard>> {
    prepare_dirs(&config.dir)?;

    let mut guards = Vec::with_capacity(LOG_TYPES.len());

    // Main log - all logs
    let (main_appender, main_guard) = create_appender(&config.dir, "main");
    guards.push(main_guard);

    // Error log - ERROR and WARN only
    let (error_appender, error_guard) = create_appender(&config.dir, "error");
    guards.push(error_guard);

    // Exchange log - market lists and ticker fetches
    let (exchange_appender, exchange_guard) = create_appender(&config.dir, "exchange");
    guards.push(exchange_guard);

    let main_layer = tracing_subscriber::fmt::layer()
        .with_writer(main_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .json();

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(tracing_subscriber::filter::LevelFilter::WARN);

    let exchange_layer = tracing_subscriber::fmt::layer()
        .with_writer(exchange_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target().contains("exchange")
                || metadata.target().contains("binance")
                || metadata.target().contains("bitrue")
        }));

    let console_layer = config
        .console
        .then(|| tracing_subscriber::fmt::layer().with_target(true).with_level(true));

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(main_layer)
        .with(error_layer)
        .with(exchange_layer)
        .with(console_layer)
        .try_init()
        .map_err(io::Error::other)?;

    tracing::info!(dir = %config.dir.display(), "Logging system initialized");

    Ok(guards)
}

/// Create the log directory and one subdirectory per log type
fn prepare_dirs(dir: &Path) -> io::Result<()> {
    for log_type in LOG_TYPES {
        fs::create_dir_all(dir.join(log_type))?;
    }
    Ok(())
}

/// Daily rolling, non-blocking appender in `<dir>/<name>/`
fn create_appender(dir: &Path, name: &str) -> (NonBlocking, WorkerGuard) {
    let appender = RollingFileAppender::new(Rotation::DAILY, dir.join(name), name);
    tracing_appender::non_blocking(appender)
}

/// Log macro helpers for specific log types
#[macro_export]
macro_rules! log_poll {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "poll", $level, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_exchange {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "exchange", $level, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_creation() {
        let test_dir = std::env::temp_dir().join(format!("ticker_delta_logs_{}", std::process::id()));
        fs::remove_dir_all(&test_dir).ok();

        prepare_dirs(&test_dir).unwrap();
        for log_type in LOG_TYPES {
            assert!(test_dir.join(log_type).is_dir());
        }
        // Idempotent
        prepare_dirs(&test_dir).unwrap();

        fs::remove_dir_all(&test_dir).ok();
    }

    #[test]
    fn test_macros_compile_without_subscriber() {
        crate::log_poll!(tracing::Level::DEBUG, cycle = 1u64, "no subscriber installed");
        crate::log_exchange!(tracing::Level::INFO, "no subscriber installed");
    }
}
