//! calbot entry point.

use std::process::ExitCode;

use clap::Parser;

use calbot_bot::cli::{Cli, Command, ConfigAction};
use calbot_bot::commands;
use calbot_bot::config::BotConfig;
use calbot_bot::error::BotResult;
use calbot_core::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> BotResult<()> {
    let mut config = match cli.config {
        Some(ref path) => BotConfig::load_from(path)?,
        None => BotConfig::load()?,
    };
    config.apply_cli(&cli);

    match cli.command {
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
        Some(Command::Run) | None => {
            init_tracing(config.tracing_config()?)?;
            calbot_bot::runtime::run(config).await
        }
    }
}
