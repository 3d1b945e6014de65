//! Core types: timestamps, events, filters, tracing

pub mod event;
pub mod filter;
pub mod time;
pub mod tracing;

pub use event::{Event, Subscription};
pub use filter::{Filter, FilterError, FilterField, compile_pattern};
pub use time::{IcsTimestamp, TimestampError};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
