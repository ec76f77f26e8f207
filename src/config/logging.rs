//! Logging configuration and initialization.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Error, Result};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines for a terminal.
    #[default]
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

/// The `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directives in `RUST_LOG` syntax, e.g. `info` or
    /// `connwatch=debug,warn`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Check that `level` parses as a filter.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.filter().map(drop)
    }

    /// Filter built from `level` alone.
    fn filter(&self) -> std::result::Result<EnvFilter, ConfigError> {
        let level = self.level.trim();
        if level.is_empty() {
            return Err(ConfigError::MissingField {
                field: "logging.level",
            });
        }
        EnvFilter::try_new(level).map_err(|e| ConfigError::InvalidValue {
            field: "logging.level",
            reason: e.to_string(),
        })
    }

    /// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
    ///
    /// # Errors
    ///
    /// Fails when `level` does not parse or a global subscriber is already
    /// installed.
    pub fn init(&self) -> Result<()> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => self.filter()?,
        };

        let installed = match self.format {
            LogFormat::Json => fmt().json().with_env_filter(filter).try_init(),
            LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
        };
        installed.map_err(|e| Error::Logging(e.to_string()))
    }
}
