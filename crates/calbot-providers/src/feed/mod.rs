//! Calendar feed retrieval.
//!
//! A [`FeedFetcher`] downloads one iCalendar document and returns its events
//! as [`RawEvent`]s. The `ics` feature provides [`HttpFeedFetcher`], which
//! fetches over HTTP(S) with reqwest and parses with `icalendar`.

#[cfg(feature = "ics")]
mod client;
#[cfg(feature = "ics")]
mod config;
#[cfg(feature = "ics")]
mod ics;

#[cfg(feature = "ics")]
pub use client::HttpFeedFetcher;
#[cfg(feature = "ics")]
pub use config::FeedConfig;
#[cfg(feature = "ics")]
pub use ics::parse_feed;

use crate::error::ProviderResult;
use crate::publisher::BoxFuture;
use crate::raw_event::RawEvent;

/// Retrieves the events of a remote calendar.
///
/// Implementations must be `Send + Sync` so one fetcher can be shared by
/// concurrent command handlers.
pub trait FeedFetcher: Send + Sync {
    /// Short adapter name used in errors and logs.
    fn name(&self) -> &str;

    /// Fetches and parses the calendar at `url`.
    ///
    /// Fails if the URL cannot be retrieved or the body is not an
    /// iCalendar document. An empty calendar is not an error.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>>;
}
