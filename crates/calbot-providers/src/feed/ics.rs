//! iCalendar document parsing.

use icalendar::{Calendar, CalendarComponent, Component};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::RawEvent;

/// Parses an iCalendar document into one [`RawEvent`] per `VEVENT`.
///
/// The document must open with `BEGIN:VCALENDAR` and carry a `VERSION`
/// property. Property values are copied verbatim; see
/// [`crate::normalize_event`] for validation.
pub fn parse_feed(text: &str) -> ProviderResult<Vec<RawEvent>> {
    check_envelope(text)?;

    let calendar = text
        .parse::<Calendar>()
        .map_err(|e| ProviderError::invalid_feed(format!("failed to parse calendar: {}", e)))?;

    let events: Vec<RawEvent> = calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(raw_event(event)),
            _ => None,
        })
        .collect();

    debug!(count = events.len(), "parsed calendar feed");
    Ok(events)
}

fn check_envelope(text: &str) -> ProviderResult<()> {
    let first = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    if !first.eq_ignore_ascii_case("BEGIN:VCALENDAR") {
        return Err(ProviderError::invalid_feed(
            "document does not start with BEGIN:VCALENDAR",
        ));
    }

    let has_version = text
        .lines()
        .any(|line| line.trim_start().to_ascii_uppercase().starts_with("VERSION:"));
    if !has_version {
        return Err(ProviderError::invalid_feed("calendar has no VERSION property"));
    }

    Ok(())
}

fn raw_event(event: &icalendar::Event) -> RawEvent {
    let prop = |name: &str| event.property_value(name).map(str::to_string);

    RawEvent {
        uid: prop("UID"),
        summary: prop("SUMMARY"),
        description: prop("DESCRIPTION"),
        location: prop("LOCATION"),
        start: prop("DTSTART"),
        end: prop("DTEND"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    fn team_ics() -> &'static str {
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Test//Test//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:standup-1@example.com\r\n\
         DTSTART:20250205T100000Z\r\n\
         DTEND:20250205T101500Z\r\n\
         SUMMARY:Standup\r\n\
         DESCRIPTION:daily\r\n\
         LOCATION:Room A\r\n\
         END:VEVENT\r\n\
         BEGIN:VEVENT\r\n\
         UID:retro-1@example.com\r\n\
         DTSTART:20250207T150000\r\n\
         SUMMARY:Retro\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR"
    }

    #[test]
    fn parses_events_verbatim() {
        let events = parse_feed(team_ics()).unwrap();
        assert_eq!(events.len(), 2);

        let standup = &events[0];
        assert_eq!(standup.uid.as_deref(), Some("standup-1@example.com"));
        assert_eq!(standup.summary.as_deref(), Some("Standup"));
        assert_eq!(standup.start.as_deref(), Some("20250205T100000Z"));
        assert_eq!(standup.end.as_deref(), Some("20250205T101500Z"));
        assert_eq!(standup.location.as_deref(), Some("Room A"));

        let retro = &events[1];
        assert_eq!(retro.summary.as_deref(), Some("Retro"));
        assert_eq!(retro.start.as_deref(), Some("20250207T150000"));
        assert!(retro.end.is_none());
        assert!(retro.description.is_none());
        assert!(retro.location.is_none());
    }

    #[test]
    fn empty_calendar_has_no_events() {
        let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//Test//EN\r\nEND:VCALENDAR";
        assert!(parse_feed(ics).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_calendar_body() {
        let err = parse_feed("<html><body>Not found</body></html>").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidFeed);
    }

    #[test]
    fn rejects_missing_version() {
        let ics = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nSUMMARY:x\r\nEND:VEVENT\r\nEND:VCALENDAR";
        let err = parse_feed(ics).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidFeed);
        assert!(err.message().contains("VERSION"));
    }

    #[test]
    fn rejects_empty_body() {
        assert!(parse_feed("").is_err());
        assert!(parse_feed("\r\n\r\n").is_err());
    }
}
