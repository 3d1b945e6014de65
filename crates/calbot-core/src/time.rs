//! iCalendar timestamp parsing.
//!
//! Feeds carry `DTSTART`/`DTEND` values in one of two shapes:
//! - `20250205T100000Z`: a UTC instant, selected by the trailing `Z`
//! - `20250205T100000`: a floating time with no zone attached
//!
//! Floating times are placed on the UTC clock when converted to an instant.
//! Both shapes keep their source form, so formatting a parsed value yields the
//! original digits again.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// `strftime` layout shared by both timestamp shapes (without the `Z`).
const ICS_LAYOUT: &str = "%Y%m%dT%H%M%S";

/// A timestamp value could not be parsed.
#[derive(Debug, Error)]
#[error("unable to parse time {value:?}: {source}")]
pub struct TimestampError {
    value: String,
    #[source]
    source: chrono::ParseError,
}

impl TimestampError {
    /// Returns the raw value that failed to parse.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A `DATE-TIME` value as written in a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcsTimestamp {
    /// `YYYYMMDDTHHMMSSZ`
    Utc(DateTime<Utc>),
    /// `YYYYMMDDTHHMMSS`
    Floating(NaiveDateTime),
}

impl IcsTimestamp {
    /// Parses a feed timestamp. A trailing `Z` selects UTC parsing.
    pub fn parse(value: &str) -> Result<Self, TimestampError> {
        let fail = |source| TimestampError {
            value: value.to_string(),
            source,
        };

        match value.strip_suffix('Z') {
            Some(digits) => NaiveDateTime::parse_from_str(digits, ICS_LAYOUT)
                .map(|naive| Self::Utc(Utc.from_utc_datetime(&naive)))
                .map_err(fail),
            None => NaiveDateTime::parse_from_str(value, ICS_LAYOUT)
                .map(Self::Floating)
                .map_err(fail),
        }
    }

    /// Returns true for the `Z`-suffixed shape.
    pub fn is_utc(&self) -> bool {
        matches!(self, Self::Utc(_))
    }

    /// Converts to an instant. Floating values are read as UTC wall time.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Self::Utc(dt) => *dt,
            Self::Floating(naive) => Utc.from_utc_datetime(naive),
        }
    }
}

impl fmt::Display for IcsTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc(dt) => write!(f, "{}Z", dt.format(ICS_LAYOUT)),
            Self::Floating(naive) => write!(f, "{}", naive.format(ICS_LAYOUT)),
        }
    }
}

impl FromStr for IcsTimestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
