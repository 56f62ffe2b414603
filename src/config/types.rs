use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Locale whose page supplies every field except the per-locale names
pub const PRIMARY_LOCALE: &str = "en";

/// Main configuration structure for a scrape run
///
/// Every section has defaults matching the public Lodestone site, so an empty
/// file (or no file at all) yields a working configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub fetch: FetchConfig,
    pub retry: RetryConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
    #[serde(rename = "locale")]
    pub locales: Vec<LocaleEntry>,
}

/// HTTP fetch and cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum number of simultaneous in-flight requests
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: u32,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Directory holding one file per cached response
    #[serde(rename = "cache-dir")]
    pub cache_dir: PathBuf,

    /// Age after which a cached response is discarded
    #[serde(rename = "cache-expiry-hours")]
    pub cache_expiry_hours: u64,
}

/// Retry behaviour for failed and rate-limited requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Failures tolerated per request before the run is aborted (429s excluded)
    #[serde(rename = "max-failures")]
    pub max_failures: u32,

    /// Fixed delay after a failed attempt (seconds)
    #[serde(rename = "backoff-secs")]
    pub backoff_secs: u64,

    /// Delay used when a 429 response carries no usable Retry-After (seconds)
    #[serde(rename = "default-retry-after-secs")]
    pub default_retry_after_secs: u64,
}

/// Listing endpoint paths, resolved against the primary locale
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    #[serde(rename = "recipe-list-path")]
    pub recipe_list_path: String,

    #[serde(rename = "item-list-path")]
    pub item_list_path: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one JSON file per catalog
    pub directory: PathBuf,
}

/// One locale and the origin serving its pages
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LocaleEntry {
    /// Locale code used as the key in every name map (e.g. "en")
    pub code: String,

    /// Origin of the locale's site (e.g. "http://na.finalfantasyxiv.com")
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl ScraperConfig {
    /// Locale codes in configured order
    pub fn locale_codes(&self) -> Vec<&str> {
        self.locales.iter().map(|l| l.code.as_str()).collect()
    }

    /// The entry for the primary locale, if configured
    pub fn primary_locale(&self) -> Option<&LocaleEntry> {
        self.locales.iter().find(|l| l.code == PRIMARY_LOCALE)
    }
}

impl FetchConfig {
    pub fn cache_expiry(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cache_expiry_hours as i64)
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn default_retry_after(&self) -> Duration {
        Duration::from_secs(self.default_retry_after_secs)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            retry: RetryConfig::default(),
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            locales: default_locales(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            user_agent: format!("lodestone-scraper/{}", env!("CARGO_PKG_VERSION")),
            cache_dir: PathBuf::from(".cache"),
            cache_expiry_hours: 12,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            backoff_secs: 5,
            default_retry_after_secs: 5,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            recipe_list_path: "/lodestone/playguide/db/recipe/".to_string(),
            item_list_path: "/lodestone/playguide/db/item/".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("out"),
        }
    }
}

fn default_locales() -> Vec<LocaleEntry> {
    [
        ("en", "http://na.finalfantasyxiv.com"),
        ("ja", "http://jp.finalfantasyxiv.com"),
        ("fr", "http://fr.finalfantasyxiv.com"),
        ("de", "http://de.finalfantasyxiv.com"),
    ]
    .into_iter()
    .map(|(code, base_url)| LocaleEntry {
        code: code.to_string(),
        base_url: base_url.to_string(),
    })
    .collect()
}
