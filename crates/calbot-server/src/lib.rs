//! Subscription orchestration, persistence and process lifecycle.
//!
//! This crate provides the stateful half of calbot:
//! - [`Orchestrator`]: Subscribe, Unsubscribe and Filter over a calendar URL
//! - [`SqliteStore`]: the durable record of subscriptions, events and filters
//! - [`SignalHandler`]: graceful shutdown on SIGINT/SIGTERM
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use calbot_providers::{EventPublisher, FeedFetcher};
//! use calbot_server::{Orchestrator, SqliteStore};
//!
//! fn build(
//!     fetcher: Arc<dyn FeedFetcher>,
//!     publisher: Arc<dyn EventPublisher>,
//! ) -> Result<Orchestrator, Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open("calendars.db")?);
//!     Ok(Orchestrator::new(store, fetcher, publisher))
//! }
//! ```

mod error;
mod locks;
mod orchestrator;
mod progress;
mod signals;
mod store;

pub use error::{
    PublishFailure, PublishFailures, StoreError, StoreResult, SyncError, SyncResult,
};
pub use locks::{UrlGuard, UrlLocks};
pub use orchestrator::{
    FilterOutcome, Orchestrator, SubscribeOutcome, SubscribeRequest, UnsubscribeOutcome,
};
pub use progress::{ProgressReporter, Transcript};
pub use signals::{ShutdownSignal, SignalHandler};
pub use store::{EventStore, SqliteStore};
