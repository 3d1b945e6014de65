//! Configuration commands.

use crate::config::BotConfig;
use crate::error::{BotError, BotResult};

/// Dump the effective configuration to stdout.
pub fn dump(config: &BotConfig) -> BotResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| BotError::config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", BotConfig::default_path().display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration, including the token reference.
pub fn validate(config: &BotConfig) -> BotResult<()> {
    config.validate()?;
    config.resolve_token()?;
    println!("Discord token resolved.");
    println!("Database: {}", config.database_path().display());
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> BotResult<()> {
    println!("config: {}", BotConfig::default_path().display());
    println!("database: {}", BotConfig::default_database_path().display());
    Ok(())
}
