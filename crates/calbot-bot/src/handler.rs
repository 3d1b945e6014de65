//! Gateway event handler: command registration and dispatch.

use std::sync::Arc;

use calbot_core::Filter;
use calbot_server::{Orchestrator, StoreError, SubscribeRequest, SyncError};
use serenity::all::{Command, CommandDataOptionValue, CommandId, CommandInteraction, GuildId};
use serenity::async_trait;
use serenity::builder::{
    CreateInteractionResponse, CreateInteractionResponseMessage, EditInteractionResponse,
};
use serenity::http::Http;
use serenity::model::application::Interaction;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::progress::InteractionProgress;
use crate::render;
use crate::slash::{self, SlashCommand};

/// Where slash commands are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    Global,
    /// A single guild. Changes show up immediately, useful in development.
    Guild(GuildId),
}

impl CommandScope {
    pub fn from_guild_id(guild_id: Option<u64>) -> Self {
        match guild_id {
            Some(id) if id != 0 => Self::Guild(GuildId::new(id)),
            _ => Self::Global,
        }
    }
}

/// Tracks registered commands so they can be removed on shutdown.
pub struct Registration {
    scope: CommandScope,
    registered: Mutex<Vec<CommandId>>,
}

impl Registration {
    pub fn new(scope: CommandScope) -> Self {
        Self {
            scope,
            registered: Mutex::new(Vec::new()),
        }
    }

    pub fn scope(&self) -> CommandScope {
        self.scope
    }

    /// Replaces the commands in scope with the bot's definitions.
    pub async fn register(&self, http: &Http) -> serenity::Result<usize> {
        let commands = match self.scope {
            CommandScope::Global => Command::set_global_commands(http, slash::definitions()).await?,
            CommandScope::Guild(guild) => guild.set_commands(http, slash::definitions()).await?,
        };

        let mut registered = self.registered.lock().await;
        *registered = commands.iter().map(|c| c.id).collect();
        Ok(registered.len())
    }

    /// Deletes every command registered by [`Registration::register`].
    /// Failures are logged.
    pub async fn unregister(&self, http: &Http) {
        let ids = std::mem::take(&mut *self.registered.lock().await);
        for id in ids {
            let result = match self.scope {
                CommandScope::Global => Command::delete_global_command(http, id).await,
                CommandScope::Guild(guild) => guild.delete_command(http, id).await,
            };
            match result {
                Ok(()) => debug!(command = %id, "deleted slash command"),
                Err(e) => warn!(command = %id, error = %e, "failed to delete slash command"),
            }
        }
    }
}

pub struct Handler {
    orchestrator: Arc<Orchestrator>,
    registration: Arc<Registration>,
}

impl Handler {
    pub fn new(orchestrator: Arc<Orchestrator>, registration: Arc<Registration>) -> Self {
        Self {
            orchestrator,
            registration,
        }
    }

    #[instrument(skip_all, fields(command = %command.data.name, guild = ?command.guild_id))]
    async fn handle_command(&self, ctx: &Context, command: &CommandInteraction) {
        let Some(guild_id) = command.guild_id else {
            respond_ephemeral(ctx, command, render::guild_only()).await;
            return;
        };

        let parsed = match slash::parse(&command.data.name, &string_options(command)) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "rejected command input");
                respond_ephemeral(ctx, command, render::input_error(&e)).await;
                return;
            }
        };

        if let Err(e) = command.defer(&ctx.http).await {
            error!(error = %e, "failed to defer interaction");
            return;
        }

        let reply = self.execute(&ctx.http, command, guild_id, parsed).await;
        if let Err(e) = command
            .edit_response(
                &ctx.http,
                EditInteractionResponse::new().content(render::clamp(&reply)),
            )
            .await
        {
            error!(error = %e, "failed to send command reply");
        }
    }

    async fn execute(
        &self,
        http: &Http,
        command: &CommandInteraction,
        guild_id: GuildId,
        parsed: SlashCommand,
    ) -> String {
        let guild = guild_id.to_string();
        match parsed {
            SlashCommand::Subscribe { url, filter } => {
                let mut request = SubscribeRequest::new(&url, &guild);
                if let Some((field, pattern)) = filter {
                    match Filter::new(&url, &field, &pattern) {
                        Ok(filter) => request = request.with_filter(filter),
                        Err(e) => return render::filter_error(&e),
                    }
                }
                let progress = InteractionProgress::new(http, command);
                match self.orchestrator.subscribe(request, &progress).await {
                    Ok(outcome) => render::subscribed(&url, &outcome),
                    Err(e) => failed("Error subscribing to calendar", &e),
                }
            }
            SlashCommand::Unsubscribe { url } => {
                match self.orchestrator.unsubscribe(&url, &guild).await {
                    Ok(outcome) => render::unsubscribed(&url, &outcome),
                    Err(e) => failed("Error unsubscribing from calendar", &e),
                }
            }
            SlashCommand::Filter {
                url,
                field,
                pattern,
            } => match self.orchestrator.filter(&url, &guild, &field, &pattern).await {
                Ok(outcome) => render::filtered(&outcome),
                Err(e) => failed("Error filtering calendar", &e),
            },
            SlashCommand::Unfilter {
                url,
                field,
                pattern,
            } => match self.orchestrator.remove_filter(&url, &field, &pattern).await {
                Ok(filter) => render::unfiltered(&filter),
                Err(e) => failed("Error removing filter", &e),
            },
            SlashCommand::Events { url } => match self.orchestrator.events(&url) {
                Ok(events) => render::events(&url, &events),
                Err(e) if is_not_subscribed(&e) => self.not_subscribed(&url),
                Err(e) => failed("Error listing events", &e),
            },
            SlashCommand::Filters { url } => match self.orchestrator.filters(&url) {
                Ok(filters) => render::filters(&url, &filters),
                Err(e) if is_not_subscribed(&e) => self.not_subscribed(&url),
                Err(e) => failed("Error listing filters", &e),
            },
        }
    }

    fn not_subscribed(&self, url: &str) -> String {
        match self.orchestrator.subscriptions() {
            Ok(subscriptions) => render::not_subscribed(url, &subscriptions),
            Err(e) => failed("Error listing subscriptions", &e),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            scope = ?self.registration.scope(),
            "connected to discord"
        );
        match self.registration.register(&ctx.http).await {
            Ok(count) => info!(commands = count, "registered slash commands"),
            Err(e) => error!(error = %e, "failed to register slash commands"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.handle_command(&ctx, &command).await;
        }
    }
}

fn failed(action: &str, err: &SyncError) -> String {
    warn!(error = %err, "{}", action);
    render::sync_error(action, err)
}

fn is_not_subscribed(err: &SyncError) -> bool {
    matches!(
        err,
        SyncError::Persistence(StoreError::NotFound {
            what: "subscription",
            ..
        })
    )
}

fn string_options(command: &CommandInteraction) -> Vec<(String, String)> {
    command
        .data
        .options
        .iter()
        .filter_map(|opt| match &opt.value {
            CommandDataOptionValue::String(s) => Some((opt.name.clone(), s.clone())),
            _ => None,
        })
        .collect()
}

async fn respond_ephemeral(ctx: &Context, command: &CommandInteraction, content: String) {
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    );
    if let Err(e) = command.create_response(&ctx.http, response).await {
        error!(error = %e, "failed to respond to interaction");
    }
}
