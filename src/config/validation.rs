use crate::config::types::{
    FetchConfig, LocaleEntry, OutputConfig, RetryConfig, ScraperConfig, SourceConfig,
    PRIMARY_LOCALE,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

const MAX_CACHE_EXPIRY_HOURS: u64 = 24 * 365;

/// Validates the entire configuration
pub fn validate(config: &ScraperConfig) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_retry_config(&config.retry)?;
    validate_source_config(&config.source)?;
    validate_output_config(&config.output)?;
    validate_locales(&config.locales)?;
    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_concurrency < 1 || config.max_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrency must be between 1 and 100, got {}",
            config.max_concurrency
        )));
    }

    if config.cache_expiry_hours == 0 || config.cache_expiry_hours > MAX_CACHE_EXPIRY_HOURS {
        return Err(ConfigError::Validation(format!(
            "cache-expiry-hours must be between 1 and {}, got {}",
            MAX_CACHE_EXPIRY_HOURS, config.cache_expiry_hours
        )));
    }

    if config.cache_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "cache-dir cannot be empty".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_failures < 1 {
        return Err(ConfigError::Validation(format!(
            "max-failures must be >= 1, got {}",
            config.max_failures
        )));
    }

    Ok(())
}

fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    for (key, path) in [
        ("recipe-list-path", &config.recipe_list_path),
        ("item-list-path", &config.item_list_path),
    ] {
        if !path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "{} must be an absolute path starting with '/', got '{}'",
                key, path
            )));
        }
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates locale entries
///
/// Codes must be unique and include the primary locale; base URLs must be
/// absolute http(s) origins.
fn validate_locales(locales: &[LocaleEntry]) -> Result<(), ConfigError> {
    if locales.is_empty() {
        return Err(ConfigError::Validation(
            "at least one locale must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in locales {
        validate_locale_code(&entry.code)?;

        if !seen.insert(entry.code.as_str()) {
            return Err(ConfigError::Validation(format!(
                "locale '{}' is configured more than once",
                entry.code
            )));
        }

        let url = Url::parse(&entry.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid base-url '{}' for locale '{}': {}",
                entry.base_url, entry.code, e
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "base-url '{}' must use http or https",
                entry.base_url
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "base-url '{}' has no host",
                entry.base_url
            )));
        }
    }

    if !seen.contains(PRIMARY_LOCALE) {
        return Err(ConfigError::Validation(format!(
            "the primary locale '{}' must be configured",
            PRIMARY_LOCALE
        )));
    }

    Ok(())
}

fn validate_locale_code(code: &str) -> Result<(), ConfigError> {
    if code.is_empty() {
        return Err(ConfigError::Validation(
            "locale code cannot be empty".to_string(),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ConfigError::Validation(format!(
            "locale code '{}' contains invalid characters",
            code
        )));
    }

    Ok(())
}
