//! Bot configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/calbot/config.toml` by default. Command-line flags and their
//! environment variables (`DISCORD_TOKEN`, `DISCORD_APP_ID`, `DB_PATH`) take
//! precedence over the file.
//!
//! `discord.token` supports secret references:
//! - `pass::path/in/store` resolved via `pass show`
//! - `env::VAR_NAME` resolved from the environment
//! - plain text used as-is

use std::path::{Path, PathBuf};
use std::time::Duration;

use calbot_core::{TracingConfig, TracingOutputFormat};
use calbot_providers::FeedConfig;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{BotError, BotResult};
use crate::secret;

// ---------------------------------------------------------------------------
// BotConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the calbot process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub discord: DiscordSettings,
    pub database: DatabaseSettings,
    pub feed: FeedSettings,
    pub publisher: PublisherSettings,
    pub logging: LoggingSettings,
}

/// Discord connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordSettings {
    /// Bot token (supports `pass::` and `env::` prefixes).
    pub token: Option<String>,

    /// Application id. Discovered from the gateway when unset.
    pub application_id: Option<u64>,

    /// Register slash commands in this guild only instead of globally.
    ///
    /// Guild commands update instantly, which is handy while developing.
    pub guild_id: Option<u64>,
}

/// SQLite settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file. Defaults to `<data dir>/calbot/calendars.db`.
    pub path: Option<PathBuf>,
}

/// Calendar feed download settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            timeout_secs: FeedConfig::DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

/// Defaults applied to scheduled events when the calendar omits a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherSettings {
    pub default_duration_minutes: i64,
    pub default_location: String,
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            default_duration_minutes: 60,
            default_location: "See calendar".to_string(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level for calbot crates when `RUST_LOG` is unset.
    pub level: String,
    pub format: TracingOutputFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: TracingOutputFormat::Compact,
        }
    }
}

impl BotConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> BotResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> BotResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BotError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> BotResult<Self> {
        toml::from_str(content).map_err(|e| BotError::config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calbot")
            .join("config.toml")
    }

    /// Returns the default database path.
    pub fn default_database_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calbot")
            .join("calendars.db")
    }

    /// Applies command-line and environment overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref token) = cli.token {
            self.discord.token = Some(token.clone());
        }
        if cli.application_id.is_some() {
            self.discord.application_id = cli.application_id;
        }
        if cli.guild_id.is_some() {
            self.discord.guild_id = cli.guild_id;
        }
        if let Some(ref path) = cli.db_path {
            self.database.path = Some(path.clone());
        }
        if cli.debug {
            self.logging.level = "debug".to_string();
        }
        if cli.wants_json_logs() {
            self.logging.format = TracingOutputFormat::Json;
        }
    }

    /// Resolves the bot token, expanding secret references.
    pub fn resolve_token(&self) -> BotResult<String> {
        let raw = self.discord.token.as_deref().ok_or_else(|| {
            BotError::config(format!(
                "Discord token not found. Set DISCORD_TOKEN, pass --token, or add to {}:\n  \
                 [discord]\n  \
                 token = \"env::DISCORD_TOKEN\"",
                Self::default_path().display()
            ))
        })?;

        let token = secret::resolve(raw).map_err(|source| BotError::Secret {
            what: "discord.token",
            source,
        })?;
        if token.trim().is_empty() {
            return Err(BotError::config("discord.token is empty"));
        }
        Ok(token)
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(Self::default_database_path)
    }

    pub fn feed_config(&self) -> FeedConfig {
        let config = FeedConfig::new().with_timeout(Duration::from_secs(self.feed.timeout_secs));
        match self.feed.user_agent {
            Some(ref agent) => config.with_user_agent(agent),
            None => config,
        }
    }

    pub fn default_event_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.publisher.default_duration_minutes)
    }

    pub fn tracing_config(&self) -> BotResult<TracingConfig> {
        let base = if self.logging.level.eq_ignore_ascii_case("debug") {
            TracingConfig::debug()
        } else {
            TracingConfig::default()
        };
        Ok(base
            .with_level_name(&self.logging.level)?
            .with_format(self.logging.format))
    }

    /// Checks values that would otherwise fail later at runtime.
    pub fn validate(&self) -> BotResult<()> {
        if self.discord.application_id == Some(0) {
            return Err(BotError::config("discord.application_id must not be 0"));
        }
        if self.discord.guild_id == Some(0) {
            return Err(BotError::config("discord.guild_id must not be 0"));
        }
        if self.feed.timeout_secs == 0 {
            return Err(BotError::config("feed.timeout_secs must be positive"));
        }
        if self.publisher.default_duration_minutes <= 0 {
            return Err(BotError::config(
                "publisher.default_duration_minutes must be positive",
            ));
        }
        if self.publisher.default_location.trim().is_empty() {
            return Err(BotError::config("publisher.default_location must not be empty"));
        }
        self.tracing_config()?;
        Ok(())
    }

    /// Returns a copy safe to print: a plain-text token is masked, references
    /// are kept since they hold no secret.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(ref token) = config.discord.token
            && !secret::is_reference(token)
        {
            config.discord.token = Some("<redacted>".to_string());
        }
        config
    }
}
