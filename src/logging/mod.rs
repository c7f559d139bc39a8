//! Structured logging setup using tracing
//!
//! Console output is always enabled; an additional JSON file layer with
//! daily rotation is added when a log file path is configured.

use crate::config::LoggingConfig;
use crate::domain::{MosaicError, Result};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard that must be kept alive for the duration of the program
/// to ensure logs are flushed properly
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            _file_guard: file_guard,
        }
    }
}

/// Initialize the logging system based on configuration
///
/// Returns a `LoggingGuard` that must be kept alive for the duration of
/// the program.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(&config.level)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mosaic={log_level}")));

    let mut layers = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(env_filter.clone());
    layers.push(console_layer.boxed());

    let file_guard = if let Some(ref file) = config.file {
        let path = Path::new(file);
        let directory = path.parent().filter(|p| !p.as_os_str().is_empty());
        let file_name = path
            .file_name()
            .ok_or_else(|| {
                MosaicError::Configuration(format!("invalid log file path '{file}'"))
            })?
            .to_string_lossy()
            .to_string();

        if let Some(dir) = directory {
            std::fs::create_dir_all(dir).map_err(|e| {
                MosaicError::Configuration(format!(
                    "failed to create log directory {}: {e}",
                    dir.display()
                ))
            })?;
        }

        let file_appender = RollingFileAppender::new(
            Rotation::DAILY,
            directory.unwrap_or_else(|| Path::new(".")),
            file_name,
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_filter(env_filter);
        layers.push(file_layer.boxed());
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry().with(layers).init();

    tracing::info!(
        level = %config.level,
        file = config.file.as_deref().unwrap_or("disabled"),
        "logging initialized"
    );

    Ok(LoggingGuard::new(file_guard))
}

fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(MosaicError::Configuration(format!(
            "invalid log level: {other}. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}
