//! calbot Discord bot.
//!
//! Connects the orchestrator to Discord slash commands:
//! - [`slash`]: command definitions and option parsing
//! - [`handler`]: gateway event handler and command dispatch
//! - [`render`]: reply text
//! - [`runtime`]: startup, signal handling and shutdown
//! - [`config`] and [`cli`]: `config.toml` plus command-line overrides

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod handler;
pub mod progress;
pub mod render;
pub mod runtime;
pub mod secret;
pub mod slash;

pub use cli::Cli;
pub use config::BotConfig;
pub use error::{BotError, BotResult};
