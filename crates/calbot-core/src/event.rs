//! Event types for subscribed calendars.
//!
//! - [`Event`]: one calendar occurrence after normalization
//! - [`Subscription`]: the durable record that a feed URL is tracked

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::FilterField;

/// A normalized calendar event.
///
/// `id` is assigned by the downstream publisher and stays empty until the
/// event has been published. Persisted events always carry a non-empty `id`,
/// `name` and a `start_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Downstream scheduled-event identifier.
    pub id: String,
    /// Title, from the feed's `SUMMARY`.
    pub name: String,
    /// Free-form description, empty when absent.
    pub description: String,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant, when the feed provides one.
    pub end_time: Option<DateTime<Utc>>,
    /// Location, empty when absent.
    pub location: String,
    /// URL of the calendar this event came from.
    pub calendar_url: String,
}

impl Event {
    /// Creates an unpublished event with the two required fields.
    pub fn new(name: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: String::new(),
            start_time,
            end_time: None,
            location: String::new(),
            calendar_url: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_calendar_url(mut self, url: impl Into<String>) -> Self {
        self.calendar_url = url.into();
        self
    }

    /// Returns true once a downstream id has been assigned.
    pub fn is_published(&self) -> bool {
        !self.id.is_empty()
    }

    /// Returns true if the event starts strictly before `now`.
    pub fn starts_before(&self, now: DateTime<Utc>) -> bool {
        self.start_time < now
    }

    /// Returns the value of a filterable field.
    pub fn field(&self, field: FilterField) -> &str {
        match field {
            FilterField::Name => &self.name,
            FilterField::Description => &self.description,
            FilterField::Location => &self.location,
        }
    }
}

/// A tracked calendar feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Feed URL, unique.
    pub url: String,
    /// When the feed was last fetched.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn new(url: impl Into<String>, last_synced_at: DateTime<Utc>) -> Self {
        Self {
            url: url.into(),
            last_synced_at: Some(last_synced_at),
        }
    }
}
