//! Feed fetchers, event normalization and scheduled-event publishers.
//!
//! This crate holds the adapters around the subscription core:
//!
//! - [`FeedFetcher`] - retrieves a remote calendar and yields [`RawEvent`]s
//! - [`normalize_event`] - turns a [`RawEvent`] into a [`calbot_core::Event`]
//! - [`EventPublisher`] - creates and deletes scheduled events downstream
//! - [`ProviderError`] - error type shared by fetchers and publishers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  iCalendar URL  │
//! └────────┬────────┘
//!          │ FeedFetcher::fetch()
//!          ▼
//!   ┌─────────────┐
//!   │  RawEvent   │
//!   └──────┬──────┘
//!          │ normalize_event()
//!          ▼
//!   ┌─────────────┐     EventPublisher      ┌──────────────────┐
//!   │    Event    │ ──────────────────────▶ │ Discord guild    │
//!   └─────────────┘                         │ scheduled events │
//!                                           └──────────────────┘
//! ```

#[cfg(feature = "discord")]
pub mod discord;
pub mod error;
pub mod feed;
pub mod normalize;
pub mod publisher;
pub mod raw_event;

#[cfg(feature = "discord")]
pub use discord::DiscordPublisher;
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use feed::FeedFetcher;
#[cfg(feature = "ics")]
pub use feed::{FeedConfig, HttpFeedFetcher, parse_feed};
pub use normalize::{NormalizeError, normalize_event};
pub use publisher::{BoxFuture, EventPublisher, NewScheduledEvent};
pub use raw_event::RawEvent;
