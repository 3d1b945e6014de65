//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// calbot - mirror iCalendar feeds into Discord scheduled events
#[derive(Debug, Parser)]
#[command(name = "calbot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Deployment environment; `prod` implies --json-logs
    #[arg(long = "environment", env = "ENV", hide = true)]
    pub environment: Option<String>,

    // --- Discord ---
    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Discord application id
    #[arg(long, env = "DISCORD_APP_ID")]
    pub application_id: Option<u64>,

    /// Register commands in this guild only
    #[arg(long, env = "DISCORD_GUILD_ID")]
    pub guild_id: Option<u64>,

    // --- Storage ---
    /// Path to the SQLite database
    #[arg(long, env = "DB_PATH")]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns whether logs should be JSON.
    pub fn wants_json_logs(&self) -> bool {
        self.json_logs || self.environment.as_deref() == Some("prod")
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect to Discord and serve slash commands (default)
    Run,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump the effective configuration (token masked)
    Dump,

    /// Validate configuration and secret references
    Validate,

    /// Show configuration file path
    Path,
}
