//! Logging setup shared by the hook binary and tests.
//!
//! Hook stdout and stderr both belong to the repository server: stderr is
//! relayed to the committing client. Logs therefore default to `warn` so a
//! passing commit stays silent, and can be raised per repository through
//! `SENTINEL_LOG`.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "SENTINEL_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{directive}': {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("Global logger already installed")]
    AlreadyInitialized,
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub directive: String,
    pub ansi: bool,
}

impl LogConfig {
    /// Read the directive from `SENTINEL_LOG`, falling back to `default`.
    pub fn from_env(default: &str) -> Self {
        let directive = std::env::var(LOG_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default.to_string());
        Self {
            directive,
            ansi: false,
        }
    }

    /// Override the directive, e.g. for `--verbose`.
    pub fn with_level(mut self, level: &str) -> Self {
        self.directive = level.to_string();
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    pub fn filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.directive).map_err(|source| LoggingError::InvalidFilter {
            directive: self.directive.clone(),
            source,
        })
    }
}

/// Install the global subscriber, writing to stderr.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = config.filter()?;
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.ansi)
                .with_target(false),
        )
        .with(filter)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
