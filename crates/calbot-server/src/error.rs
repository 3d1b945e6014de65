//! Orchestration and persistence error types.

use std::fmt;

use calbot_core::FilterError;
use calbot_providers::ProviderError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for orchestrator operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised by an [`crate::EventStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row with the same key already exists.
    #[error("{what} already exists: {key}")]
    AlreadyExists { what: &'static str, key: String },

    /// A referenced calendar is not subscribed.
    #[error("no subscription for calendar {url}")]
    UnknownCalendar { url: String },

    /// Nothing matched a delete.
    #[error("{what} not found: {key}")]
    NotFound { what: &'static str, key: String },

    /// A value was rejected on write or could not be decoded on read.
    #[error("invalid {what}: {message}")]
    Invalid { what: &'static str, message: String },

    /// Creating the database directory failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other SQLite failure.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn already_exists(what: &'static str, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            what,
            key: key.into(),
        }
    }

    pub fn not_found(what: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            key: key.into(),
        }
    }

    pub fn unknown_calendar(url: impl Into<String>) -> Self {
        Self::UnknownCalendar { url: url.into() }
    }

    pub fn invalid(what: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            what,
            message: message.into(),
        }
    }
}

/// One failed downstream call.
#[derive(Debug)]
pub struct PublishFailure {
    /// The event id (deletes) or name (creates) the call was about.
    pub target: String,
    pub error: ProviderError,
}

/// Every downstream failure collected during one operation.
///
/// Subscribe aborts on the first failure, so it carries one entry. Unsubscribe
/// and Filter attempt every deletion and carry one entry per failed id.
#[derive(Debug, Default)]
pub struct PublishFailures {
    failures: Vec<PublishFailure>,
}

impl PublishFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(target: impl Into<String>, error: ProviderError) -> Self {
        let mut failures = Self::new();
        failures.push(target, error);
        failures
    }

    pub fn push(&mut self, target: impl Into<String>, error: ProviderError) {
        self.failures.push(PublishFailure {
            target: target.into(),
            error,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PublishFailure> {
        self.failures.iter()
    }

    /// Returns `Err(self)` when at least one failure was collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for PublishFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.as_slice() {
            [] => write!(f, "no publish failures"),
            [only] => write!(f, "publish failed for {}: {}", only.target, only.error),
            [first, rest @ ..] => write!(
                f,
                "publish failed for {} events (first: {}: {}; {} more)",
                self.failures.len(),
                first.target,
                first.error,
                rest.len()
            ),
        }
    }
}

impl std::error::Error for PublishFailures {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|f| &f.error as &(dyn std::error::Error + 'static))
    }
}

/// Errors returned by the orchestrator.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The feed could not be fetched or parsed.
    #[error("failed to fetch calendar: {0}")]
    Fetch(#[source] ProviderError),

    /// The filter field is not a filterable field.
    #[error(transparent)]
    InvalidField(FilterError),

    /// The filter pattern is not a valid regular expression.
    #[error(transparent)]
    Pattern(FilterError),

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error(transparent)]
    Publish(#[from] PublishFailures),
}

impl From<FilterError> for SyncError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidField(_) => Self::InvalidField(err),
            FilterError::Pattern { .. } => Self::Pattern(err),
        }
    }
}
