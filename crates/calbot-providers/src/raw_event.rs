//! Raw event records from a calendar feed.
//!
//! A [`RawEvent`] holds the property values of one `VEVENT` exactly as they
//! appear in the feed. Nothing is validated here; required-field checks and
//! timestamp parsing happen in [`crate::normalize`].

use serde::{Deserialize, Serialize};

/// Unvalidated property values of one `VEVENT`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// `UID`, used for log context only.
    pub uid: Option<String>,
    /// `SUMMARY`
    pub summary: Option<String>,
    /// `DESCRIPTION`
    pub description: Option<String>,
    /// `LOCATION`
    pub location: Option<String>,
    /// `DTSTART` value text.
    pub start: Option<String>,
    /// `DTEND` value text.
    pub end: Option<String>,
}

impl RawEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// A short label for logs: the summary, else the UID, else `"<unnamed>"`.
    pub fn label(&self) -> &str {
        self.summary
            .as_deref()
            .or(self.uid.as_deref())
            .unwrap_or("<unnamed>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let raw = RawEvent::new()
            .with_uid("abc@example.com")
            .with_summary("Standup")
            .with_start("20250205T100000Z")
            .with_end("20250205T101500Z")
            .with_location("Room A")
            .with_description("daily");

        assert_eq!(raw.summary.as_deref(), Some("Standup"));
        assert_eq!(raw.start.as_deref(), Some("20250205T100000Z"));
        assert_eq!(raw.end.as_deref(), Some("20250205T101500Z"));
        assert_eq!(raw.location.as_deref(), Some("Room A"));
    }

    #[test]
    fn label_falls_back() {
        assert_eq!(RawEvent::new().with_summary("Retro").label(), "Retro");
        assert_eq!(RawEvent::new().with_uid("u-1").label(), "u-1");
        assert_eq!(RawEvent::new().label(), "<unnamed>");
    }

    #[test]
    fn serde_roundtrip() {
        let raw = RawEvent::new().with_summary("Standup").with_start("20250205T100000");
        let json = serde_json::to_string(&raw).unwrap();
        let parsed: RawEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, raw);
    }
}
