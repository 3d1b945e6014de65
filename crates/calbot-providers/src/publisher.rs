//! Downstream scheduled-event publishing.
//!
//! An [`EventPublisher`] creates and deletes scheduled events in a guild. The
//! identifier it returns on creation becomes the [`Event::id`] that the store
//! keys on, so publishers must return stable, unique ids.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use calbot_core::Event;

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Used instead of `async fn` in traits so fetchers and publishers stay
/// object safe behind `Arc<dyn ...>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The payload for creating one scheduled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduledEvent {
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: String,
}

impl From<&Event> for NewScheduledEvent {
    fn from(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            location: event.location.clone(),
        }
    }
}

/// Creates and deletes scheduled events in a guild.
pub trait EventPublisher: Send + Sync {
    /// Short adapter name used in errors and logs.
    fn name(&self) -> &str;

    /// Creates a scheduled event and returns its downstream id.
    fn create_scheduled_event<'a>(
        &'a self,
        guild_id: &'a str,
        event: NewScheduledEvent,
    ) -> BoxFuture<'a, ProviderResult<String>>;

    /// Deletes a scheduled event by downstream id.
    fn delete_scheduled_event<'a>(
        &'a self,
        guild_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>>;
}
