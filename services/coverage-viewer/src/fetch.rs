//! Latest-wins tracking of in-flight range fetches.
//!
//! Moving the time or vertical slider starts a new fetch before the previous
//! one finished. Every fetch carries a [`FetchToken`]; only a completion whose
//! token is still the most recent is applied, older ones are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Identifies one fetch issued by a [`FetchTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken {
    generation: u64,
}

impl FetchToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct FetchTracker {
    latest: AtomicU64,
}

impl FetchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch. Every earlier token becomes stale.
    pub fn begin(&self) -> FetchToken {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        FetchToken { generation }
    }

    pub fn is_current(&self, token: FetchToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.generation
    }

    /// Pass `result` through if `token` is still current, drop it otherwise.
    pub fn complete<T>(&self, token: FetchToken, result: T) -> Option<T> {
        if self.is_current(token) {
            Some(result)
        } else {
            debug!(
                generation = token.generation,
                latest = self.latest.load(Ordering::Acquire),
                "Discarding stale fetch"
            );
            None
        }
    }

    /// Make every outstanding token stale without starting a fetch.
    pub fn cancel_all(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }
}
