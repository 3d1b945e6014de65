//! Conversion from raw feed records to [`Event`]s.
//!
//! `SUMMARY` and `DTSTART` are required. `DTEND` is optional but must parse
//! when present. A missing `DESCRIPTION` or `LOCATION` is logged at debug level.

use calbot_core::{Event, IcsTimestamp, TimestampError};
use thiserror::Error;
use tracing::debug;

use crate::raw_event::RawEvent;

/// A raw event could not be turned into an [`Event`].
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid {field}: {source}")]
    Parse {
        field: &'static str,
        #[source]
        source: TimestampError,
    },
}

/// Normalizes one raw event. The result is unpublished (empty `id`) and
/// tagged with `calendar_url`.
pub fn normalize_event(raw: &RawEvent, calendar_url: &str) -> Result<Event, NormalizeError> {
    let name = raw
        .summary
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(NormalizeError::MissingField("name"))?;

    let start = raw
        .start
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(NormalizeError::MissingField("start_time"))?;
    let start = IcsTimestamp::parse(start).map_err(|source| NormalizeError::Parse {
        field: "start_time",
        source,
    })?;

    let mut event = Event::new(name, start.to_utc()).with_calendar_url(calendar_url);

    if let Some(end) = raw.end.as_deref().filter(|s| !s.is_empty()) {
        let end = IcsTimestamp::parse(end).map_err(|source| NormalizeError::Parse {
            field: "end_time",
            source,
        })?;
        event = event.with_end_time(end.to_utc());
    }

    match raw.description.as_deref() {
        Some(description) => event = event.with_description(description),
        None => debug!(event = raw.label(), "event has no description"),
    }

    match raw.location.as_deref() {
        Some(location) => event = event.with_location(location),
        None => debug!(event = raw.label(), "event has no location"),
    }

    Ok(event)
}
