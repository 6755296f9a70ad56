//! Tracing setup: human-readable lines on stdout, JSON lines in the log file.
//!
//! `RUST_LOG` overrides the configured level when set.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;

/// Install the global subscriber. Call once, at startup.
pub fn init(level: &str, log_file: &Path) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| ConfigError::Logging(format!("{}: {}", log_file.display(), e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .json()
                .with_current_span(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}
