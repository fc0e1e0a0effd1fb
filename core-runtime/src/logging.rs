//! # Logging & Tracing Infrastructure
//!
//! Configures the `tracing-subscriber` stack used by every crate in the
//! workspace: an `EnvFilter` (respecting `RUST_LOG`) plus a format layer.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LoggingConfig, LogFormat};
//!
//! init_logging(LoggingConfig::default().with_format(LogFormat::Compact))
//!     .expect("logging init");
//!
//! tracing::info!("core started");
//! ```

use crate::error::{Error, Result};
use tracing_subscriber::{
    filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Filter directives applied when `RUST_LOG` is unset
    pub default_directives: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            default_directives: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_default_directives(mut self, directives: impl Into<String>) -> Self {
        self.default_directives = directives.into();
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// Fails if a subscriber is already installed; callers that may race (tests)
/// should use [`try_init_logging`] instead.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_directives))
        .map_err(|e| Error::Logging(format!("invalid filter directives: {e}")))?;

    let fmt_layer = match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Logging(format!("subscriber already installed: {e}")))
}

/// Like [`init_logging`] but silently keeps the existing subscriber when one
/// is already installed.
pub fn try_init_logging(config: LoggingConfig) {
    let _ = init_logging(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_default_directives("core_broker=debug,info");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.default_directives, "core_broker=debug,info");
    }

    #[test]
    fn double_init_is_tolerated() {
        try_init_logging(LoggingConfig::default());
        try_init_logging(LoggingConfig::default());
    }
}
