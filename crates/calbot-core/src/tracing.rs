//! Tracing setup for calbot
//!
//! One entry point, [`init_tracing`], installs a global `tracing-subscriber`
//! registry with an [`EnvFilter`] and one of three formatters. `RUST_LOG`
//! overrides the configured level when set.
//!
//! ```ignore
//! use calbot_core::tracing::{init_tracing, TracingConfig, TracingOutputFormat};
//!
//! init_tracing(TracingConfig::default().with_format(TracingOutputFormat::Json))?;
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Crates whose events are shown at the configured level. Everything else
/// (serenity, reqwest, hyper) stays at `warn`.
const OWN_TARGET: &str = "calbot";

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber is already installed
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// The filter directive did not parse
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),

    /// The configured level name is unknown
    #[error("unknown log level: {0}")]
    Level(String),
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TracingOutputFormat {
    /// Multi-line human-readable output
    Pretty,
    /// Single-line output (default)
    #[default]
    Compact,
    /// One JSON object per line, for log shippers
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level applied to calbot crates when RUST_LOG is not set
    pub level: Level,
    /// Formatter to install
    pub output_format: TracingOutputFormat,
    /// Include file and line of the callsite
    pub include_location: bool,
    /// Include the module path
    pub include_target: bool,
    /// Explicit filter directive; takes precedence over `level` and RUST_LOG
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            include_target: true,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Verbose settings for local debugging.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            include_location: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the level from a name such as `"info"` or `"DEBUG"`.
    pub fn with_level_name(self, name: &str) -> Result<Self, TracingError> {
        let level = Level::from_str(name).map_err(|_| TracingError::Level(name.to_string()))?;
        Ok(self.with_level(level))
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// The directive used when neither `env_filter` nor RUST_LOG is set.
    pub fn default_directive(&self) -> String {
        format!("warn,{}={}", OWN_TARGET, self.level)
    }

    fn build_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref directive) = self.env_filter {
            return Ok(EnvFilter::try_new(directive)?);
        }
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(self.default_directive())?),
        }
    }
}

/// Installs the global subscriber.
///
/// Call once at startup.
///
/// # Errors
///
/// Fails if a global subscriber is already set or a directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.build_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let layer = fmt::layer()
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_target);

    match config.output_format {
        TracingOutputFormat::Pretty => {
            tracing::subscriber::set_global_default(registry.with(layer.pretty()))?
        }
        TracingOutputFormat::Compact => {
            tracing::subscriber::set_global_default(registry.with(layer.compact()))?
        }
        TracingOutputFormat::Json => {
            tracing::subscriber::set_global_default(registry.with(layer.json()))?
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.output_format, TracingOutputFormat::Compact);
        assert!(!config.include_location);
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn debug_config() {
        let config = TracingConfig::debug();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.include_location);
    }

    #[test]
    fn level_name_parsing() {
        let config = TracingConfig::default().with_level_name("debug").unwrap();
        assert_eq!(config.level, Level::DEBUG);
        assert!(matches!(
            TracingConfig::default().with_level_name("chatty"),
            Err(TracingError::Level(_))
        ));
    }

    #[test]
    fn default_directive_scopes_own_crates() {
        let config = TracingConfig::default().with_level(Level::TRACE);
        assert_eq!(config.default_directive(), "warn,calbot=TRACE");
    }

    #[test]
    fn format_deserializes_from_snake_case() {
        let format: TracingOutputFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, TracingOutputFormat::Json);
    }
}
