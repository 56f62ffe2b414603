//! Crawler module for page fetching and catalog assembly
//!
//! This module contains the network side of a scrape run, including:
//! - HTTP fetching with caching, admission control and retries
//! - Listing pagination
//! - Fetching one entity from every locale
//! - Overall catalog coordination

mod coordinator;
mod fetcher;
mod locale;
mod pagination;
mod retry;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, Fetcher};
pub use locale::{fetch_entity_pages, locale_url};
pub use pagination::walk;
pub use retry::RetryPolicy;
