//! Configuration module for Lodestone Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; the defaults target the public Lodestone site.
//!
//! # Example
//!
//! ```no_run
//! use lodestone_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Locales: {:?}", config.locale_codes());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    FetchConfig, LocaleEntry, OutputConfig, RetryConfig, ScraperConfig, SourceConfig,
    PRIMARY_LOCALE,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
