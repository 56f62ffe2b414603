//! Response cache trait
//!
//! The fetcher only depends on this interface, so the on-disk store can be
//! replaced (or disabled) without touching retry and admission logic.

use crate::cache::FetchKey;

/// Storage for raw response bodies keyed by request identity
///
/// Both operations are infallible from the caller's point of view: a cache
/// that cannot read returns `None`, and a cache that cannot write logs and
/// moves on. A successful fetch must never fail because of the cache.
pub trait ResponseCache: Send + Sync {
    /// Returns the cached body for `key`, or `None` if missing, unreadable or expired
    fn lookup(&self, key: &FetchKey) -> Option<String>;

    /// Stores `body` under `key`, replacing any previous entry
    fn store(&self, key: &FetchKey, body: &str);
}

/// A cache that never holds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl ResponseCache for NoCache {
    fn lookup(&self, _key: &FetchKey) -> Option<String> {
        None
    }

    fn store(&self, _key: &FetchKey, _body: &str) {}
}
