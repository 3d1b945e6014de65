//! Bot startup and shutdown.

use std::sync::Arc;

use calbot_providers::{DiscordPublisher, HttpFeedFetcher};
use calbot_server::{Orchestrator, SignalHandler, SqliteStore};
use serenity::http::Http;
use serenity::model::gateway::GatewayIntents;
use serenity::model::id::ApplicationId;
use tracing::{error, info};

use crate::config::BotConfig;
use crate::error::BotResult;
use crate::handler::{CommandScope, Handler, Registration};

/// Runs the bot until the gateway stops or a shutdown signal arrives.
///
/// On shutdown the slash commands registered at startup are deleted.
pub async fn run(config: BotConfig) -> BotResult<()> {
    config.validate()?;
    let token = config.resolve_token()?;

    let database_path = config.database_path();
    let store = Arc::new(SqliteStore::open(&database_path)?);
    info!(path = %database_path.display(), "opened database");

    let fetcher = Arc::new(HttpFeedFetcher::new(config.feed_config())?);
    let publisher = Arc::new(
        DiscordPublisher::new(Arc::new(Http::new(&token)))
            .with_default_duration(config.default_event_duration())
            .with_default_location(config.publisher.default_location.clone()),
    );
    let orchestrator = Arc::new(Orchestrator::new(store, fetcher, publisher));

    let registration = Arc::new(Registration::new(CommandScope::from_guild_id(
        config.discord.guild_id,
    )));
    let handler = Handler::new(orchestrator, registration.clone());

    let mut builder = serenity::Client::builder(&token, GatewayIntents::GUILDS).event_handler(handler);
    if let Some(id) = config.discord.application_id.filter(|id| *id != 0) {
        builder = builder.application_id(ApplicationId::new(id));
    }
    let mut client = builder.await?;

    let http = client.http.clone();
    let shard_manager = client.shard_manager.clone();

    let signals = SignalHandler::new();
    signals.spawn_listener();
    let shutdown = signals.shutdown();

    info!("starting discord client");
    let result = tokio::select! {
        result = client.start() => {
            if let Err(e) = &result {
                error!(error = %e, "discord client stopped");
            }
            result
        }
        _ = shutdown.wait() => {
            info!("shutting down");
            Ok(())
        }
    };

    registration.unregister(&http).await;
    shard_manager.shutdown_all().await;
    info!("shutdown complete");

    result.map_err(Into::into)
}
