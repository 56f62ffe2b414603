//! Lodestone Scraper main entry point
//!
//! This is the command-line interface for building crafting catalogs from the
//! Lodestone game database.

use anyhow::Context;
use clap::Parser;
use lodestone_scraper::cache::DiskCache;
use lodestone_scraper::catalog::LanguageOverrides;
use lodestone_scraper::config::{load_config, validate};
use lodestone_scraper::output::relabel_catalogs;
use lodestone_scraper::{Coordinator, Profession, ScrapeError, ScraperConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Exit status after an interrupt (128 + SIGINT)
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Lodestone Scraper: crafting recipe and buff item catalogs
///
/// Scrapes recipes per crafting class and crafting buff items (medicine and
/// meals) from every configured Lodestone locale, and writes one sorted JSON
/// catalog per class or item category.
#[derive(Parser, Debug)]
#[command(name = "lodestone-scraper")]
#[command(version)]
#[command(about = "Scrapes crafting catalogs from the Lodestone", long_about = None)]
struct Cli {
    /// Crafting classes to scrape recipes for, or "all"
    #[arg(short, long, value_name = "CLASS", num_args = 1..)]
    recipes: Vec<String>,

    /// Scrape crafting buff items (medicine and meals)
    #[arg(short, long)]
    buffs: bool,

    /// Maximum number of simultaneous requests
    #[arg(short, long, value_name = "N")]
    concurrency: Option<u32>,

    /// Additional language names as LANG=FILE (JSON object of English name to name)
    #[arg(short = 'l', long = "lang-file", value_name = "LANG=FILE")]
    lang_files: Vec<String>,

    /// Delete the response cache before scraping
    #[arg(long)]
    clear_cache: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Apply --lang-file names to existing catalogs and exit, without scraping
    #[arg(long, conflicts_with_all = ["recipes", "buffs", "clear_cache"])]
    relabel: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_scraper_config(&cli)?;
    let overrides = LanguageOverrides::load(&cli.lang_files)?;

    if cli.relabel {
        return handle_relabel(&config, &overrides);
    }

    // Targets are checked before anything touches the network
    let professions = Profession::parse_list(&cli.recipes)?;
    if professions.is_empty() && !cli.buffs {
        return Err(ScrapeError::NoTarget.into());
    }

    if cli.clear_cache {
        DiskCache::new(&config.fetch.cache_dir, config.fetch.cache_expiry())
            .clear()
            .with_context(|| {
                format!(
                    "Failed to clear cache directory {}",
                    config.fetch.cache_dir.display()
                )
            })?;
    }

    let coordinator = Coordinator::new(config)?;

    tokio::select! {
        result = handle_scrape(&coordinator, &professions, cli.buffs, &overrides) => result,
        () = shutdown_signal() => {
            tracing::warn!("Scrape interrupted, in-flight requests abandoned");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lodestone_scraper=info,warn"),
            1 => EnvFilter::new("lodestone_scraper=debug,info"),
            2 => EnvFilter::new("lodestone_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (or defaults) and applies command-line overrides
fn load_scraper_config(cli: &Cli) -> anyhow::Result<ScraperConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => ScraperConfig::default(),
    };

    if let Some(concurrency) = cli.concurrency {
        config.fetch.max_concurrency = concurrency;
        validate(&config)?;
    }

    tracing::debug!(
        "Locales: {:?}, concurrency {}",
        config.locale_codes(),
        config.fetch.max_concurrency
    );
    Ok(config)
}

/// Handles --relabel: rewrites existing catalogs with the loaded override names
fn handle_relabel(config: &ScraperConfig, overrides: &LanguageOverrides) -> anyhow::Result<()> {
    if overrides.is_empty() {
        tracing::warn!("--relabel without any --lang-file leaves catalogs unchanged");
    }

    let rewritten = relabel_catalogs(&config.output.directory, overrides)?;
    if rewritten.is_empty() {
        tracing::warn!(
            "No catalogs found in {}",
            config.output.directory.display()
        );
    }
    Ok(())
}

/// Scrapes the requested catalogs and reports the elapsed time
async fn handle_scrape(
    coordinator: &Coordinator,
    professions: &[Profession],
    buffs: bool,
    overrides: &LanguageOverrides,
) -> anyhow::Result<()> {
    let start_time = std::time::Instant::now();

    let written = coordinator
        .scrape_and_write(professions, buffs, overrides)
        .await?;

    tracing::info!(
        "Scrape complete: {} catalogs in {:.1}s",
        written.len(),
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
///
/// A signal that cannot be installed never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C)");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM");
        }
    }
}
