//! Response cache module
//!
//! Raw response bodies are cached by request identity (URL plus sorted query
//! parameters) with a fixed expiry window. Reads fail open and writes are best
//! effort; neither can fail a fetch.

mod disk;
mod entry;
mod key;
mod traits;

pub use disk::DiskCache;
pub use entry::CachedResponse;
pub use key::FetchKey;
pub use traits::{NoCache, ResponseCache};
