//! Cached response entries
//!
//! An entry stores the raw response body with the time it was fetched, so
//! staleness is decided by the entry itself rather than by file metadata.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A response body as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// When the body was fetched
    pub fetched_at: DateTime<Utc>,

    /// Raw response body text
    pub body: String,
}

impl CachedResponse {
    /// Creates an entry stamped with the current time
    pub fn new(body: impl Into<String>) -> Self {
        Self::fetched_at(body, Utc::now())
    }

    /// Creates an entry with an explicit fetch time
    pub fn fetched_at(body: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            body: body.into(),
        }
    }

    /// Age of the entry as seen at `now`
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// Whether the entry has reached the expiry window at `now`
    ///
    /// An entry written at `T` is fresh strictly before `T + expiry` and
    /// expired from `T + expiry` onward.
    pub fn is_expired_at(&self, now: DateTime<Utc>, expiry: Duration) -> bool {
        self.age_at(now) >= expiry
    }
}
