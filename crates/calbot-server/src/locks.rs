//! Per-URL mutual exclusion.
//!
//! Operations on the same calendar URL read and write the same store rows and
//! downstream events, so they run one at a time. Operations on different URLs
//! are independent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

/// Held for the duration of one operation on a URL.
pub type UrlGuard = OwnedMutexGuard<()>;

/// A keyed set of async locks.
///
/// Entries nobody holds or waits on are pruned on the next acquisition.
#[derive(Debug, Default)]
pub struct UrlLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl UrlLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other operation holds `url`.
    pub async fn lock(&self, url: &str) -> UrlGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(url.to_string()).or_default().clone()
        };
        trace!(url = %url, "acquiring url lock");
        lock.lock_owned().await
    }

    /// Number of URLs currently tracked.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
