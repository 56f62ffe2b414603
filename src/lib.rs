//! Lodestone Scraper: crafting recipe and buff item catalogs
//!
//! This crate scrapes the multi-language Lodestone game database into sorted,
//! deduplicated JSON catalogs. All network access goes through a single
//! rate-limited, retrying, disk-cached fetcher.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;

use thiserror::Error;

/// Main error type for scrape runs
///
/// Every variant except the user-input ones is fatal for the run: there is no
/// mode that skips a broken entity and keeps going.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not load page after {attempts} tries: {url}")]
    FetchExhausted { url: String, attempts: u32 },

    #[error("Pagination stalled at {url}: show_end {show_end} of {total} did not advance")]
    PaginationStalled {
        url: String,
        show_end: u32,
        total: u32,
    },

    #[error("Embed id not found on {url}")]
    IdentifierNotFound { url: String },

    #[error("Unsupported number of stars ({stars}) for level {base_level}")]
    UnsupportedStars { base_level: u32, stars: u32 },

    #[error("Missing field '{field}' on {url}")]
    MissingField { url: String, field: &'static str },

    #[error("Invalid value for '{field}' on {url}: {value:?}")]
    InvalidNumber {
        url: String,
        field: &'static str,
        value: String,
    },

    #[error("Unknown crafting class: {0}")]
    UnknownClass(String),

    #[error("One or more of the following options must be provided: --recipes, --buffs")]
    NoTarget,

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scrape task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid language spec '{0}', expected LANG=FILE")]
    LanguageSpec(String),

    #[error("Failed to load language file {path}: {message}")]
    LanguageFile { path: String, message: String },
}

/// Result type alias for scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{Item, ItemCategory, Profession, Recipe};
pub use config::ScraperConfig;
pub use crawler::{Coordinator, Fetcher, RetryPolicy};
