//! Progress reporting through a deferred interaction response.

use calbot_providers::{BoxFuture, ProviderError, ProviderResult};
use calbot_server::ProgressReporter;
use serenity::all::CommandInteraction;
use serenity::builder::EditInteractionResponse;
use serenity::http::Http;

use crate::render;

/// Edits the original response of a deferred command with each update.
pub struct InteractionProgress<'a> {
    http: &'a Http,
    command: &'a CommandInteraction,
}

impl<'a> InteractionProgress<'a> {
    pub fn new(http: &'a Http, command: &'a CommandInteraction) -> Self {
        Self { http, command }
    }
}

impl ProgressReporter for InteractionProgress<'_> {
    fn update<'a>(&'a self, transcript: &'a str) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            self.command
                .edit_response(
                    self.http,
                    EditInteractionResponse::new().content(render::clamp(transcript)),
                )
                .await
                .map(|_| ())
                .map_err(|e| {
                    ProviderError::network(format!("failed to edit interaction response: {}", e))
                        .with_provider("discord")
                        .with_source(e)
                })
        })
    }
}
