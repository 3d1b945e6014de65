//! Discord guild scheduled events.
//!
//! Discord requires an end time and a location for external events. Calendar
//! events may have neither, so [`DiscordPublisher`] fills them from its
//! configured defaults before calling the API.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serenity::builder::CreateScheduledEvent;
use serenity::http::{Http, HttpError};
use serenity::model::Timestamp;
use serenity::model::guild::ScheduledEventType;
use serenity::model::id::{GuildId, ScheduledEventId};
use tracing::debug;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::publisher::{BoxFuture, EventPublisher, NewScheduledEvent};

const PROVIDER: &str = "discord";

/// Publishes events as external guild scheduled events.
pub struct DiscordPublisher {
    http: Arc<Http>,
    default_duration: Duration,
    default_location: String,
}

impl DiscordPublisher {
    /// Default event length when the calendar gives no end time.
    pub const DEFAULT_DURATION_MINUTES: i64 = 60;

    /// Location used when the calendar gives none.
    pub const DEFAULT_LOCATION: &'static str = "See calendar";

    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            default_duration: Duration::minutes(Self::DEFAULT_DURATION_MINUTES),
            default_location: Self::DEFAULT_LOCATION.to_string(),
        }
    }

    pub fn with_default_duration(mut self, duration: Duration) -> Self {
        self.default_duration = duration;
        self
    }

    pub fn with_default_location(mut self, location: impl Into<String>) -> Self {
        self.default_location = location.into();
        self
    }

    /// Returns the end time and location actually sent to Discord.
    fn resolve(&self, event: &NewScheduledEvent) -> (DateTime<Utc>, String) {
        let end = event
            .end_time
            .filter(|end| *end > event.start_time)
            .unwrap_or(event.start_time + self.default_duration);
        let location = if event.location.trim().is_empty() {
            self.default_location.clone()
        } else {
            event.location.clone()
        };
        (end, location)
    }
}

fn parse_snowflake(kind: &str, value: &str) -> ProviderResult<u64> {
    match value.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(ProviderError::bad_request(format!("invalid {} id: {:?}", kind, value))
            .with_provider(PROVIDER)),
    }
}

fn map_serenity_error(action: &str, err: serenity::Error) -> ProviderError {
    let code = match &err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            ProviderErrorCode::from_status(response.status_code.as_u16())
        }
        serenity::Error::Http(HttpError::Request(_)) => ProviderErrorCode::NetworkError,
        _ => ProviderErrorCode::UnexpectedStatus,
    };
    ProviderError::new(code, format!("failed to {}: {}", action, err))
        .with_provider(PROVIDER)
        .with_source(err)
}

impl EventPublisher for DiscordPublisher {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn create_scheduled_event<'a>(
        &'a self,
        guild_id: &'a str,
        event: NewScheduledEvent,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            let guild = GuildId::new(parse_snowflake("guild", guild_id)?);
            let (end, location) = self.resolve(&event);

            let builder = CreateScheduledEvent::new(
                ScheduledEventType::External,
                event.name.as_str(),
                Timestamp::from(event.start_time),
            )
            .description(event.description.as_str())
            .end_time(Timestamp::from(end))
            .location(location);

            let created = guild
                .create_scheduled_event(&*self.http, builder)
                .await
                .map_err(|e| map_serenity_error("create scheduled event", e))?;

            debug!(guild = %guild, event_id = %created.id, name = %event.name, "created scheduled event");
            Ok(created.id.to_string())
        })
    }

    fn delete_scheduled_event<'a>(
        &'a self,
        guild_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            let guild = GuildId::new(parse_snowflake("guild", guild_id)?);
            let id = ScheduledEventId::new(parse_snowflake("scheduled event", event_id)?);

            guild
                .delete_scheduled_event(&*self.http, id)
                .await
                .map_err(|e| map_serenity_error("delete scheduled event", e))?;

            debug!(guild = %guild, event_id = %id, "deleted scheduled event");
            Ok(())
        })
    }
}
