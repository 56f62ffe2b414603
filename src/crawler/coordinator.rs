//! Scrape coordinator - catalog assembly
//!
//! This module drives one catalog at a time:
//! - Walking every listing of the target to collect entity links
//! - Dropping links already seen in an earlier listing
//! - Fetching and extracting all entities concurrently
//! - Sorting the records and applying language overrides

use crate::cache::FetchKey;
use crate::catalog::{
    apply_name_overrides, recipe_subcategories, sort_items, sort_recipes, Item, ItemCategory,
    LanguageOverrides, Profession, Recipe, ITEM_LISTING_CATEGORY,
};
use crate::config::{ScraperConfig, PRIMARY_LOCALE};
use crate::crawler::{fetch_entity_pages, locale_url, walk, Fetcher};
use crate::extract::{
    items_from_pages, recipe_from_pages, EntityPages, LodestoneExtractor, PageExtractor,
};
use crate::output::write_catalog;
use crate::{ConfigError, Result};
use futures::future::try_join_all;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Builds the record(s) of one entity from its locale pages
type BuildFn<T> = fn(&dyn PageExtractor, &EntityPages) -> Result<T>;

/// State shared with every entity task
struct Context {
    config: ScraperConfig,
    fetcher: Fetcher,
    extractor: Arc<dyn PageExtractor>,
}

/// Main scrape coordinator structure
#[derive(Clone)]
pub struct Coordinator {
    ctx: Arc<Context>,
}

impl Coordinator {
    /// Creates a coordinator for the Lodestone layout with a disk-cached fetcher
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self::with_parts(config, fetcher, Arc::new(LodestoneExtractor::new())))
    }

    pub fn with_parts(
        config: ScraperConfig,
        fetcher: Fetcher,
        extractor: Arc<dyn PageExtractor>,
    ) -> Self {
        Self {
            ctx: Arc::new(Context {
                config,
                fetcher,
                extractor,
            }),
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.ctx.config
    }

    /// One listing query per recipe sub-category of `profession`
    pub fn recipe_listings(&self, profession: Profession) -> Result<Vec<FetchKey>> {
        let url = self.listing_url(&self.ctx.config.source.recipe_list_path)?;
        Ok(recipe_subcategories()
            .into_iter()
            .map(|subcategory| {
                FetchKey::new(url.as_str())
                    .param("category2", profession.listing_index())
                    .param("category3", subcategory)
            })
            .collect())
    }

    /// The listing query for an item category
    pub fn item_listing(&self, category: ItemCategory) -> Result<FetchKey> {
        let url = self.listing_url(&self.ctx.config.source.item_list_path)?;
        Ok(FetchKey::new(url)
            .param("category2", ITEM_LISTING_CATEGORY)
            .param("category3", category.listing_id()))
    }

    /// Scrapes every recipe of a profession
    ///
    /// Recipes are sorted by level, English name, then id, and carry the
    /// override names for every override locale.
    pub async fn scrape_recipes(
        &self,
        profession: Profession,
        overrides: &LanguageOverrides,
    ) -> Result<Vec<Recipe>> {
        tracing::info!("Scraping {} recipes", profession);
        let links = self.collect_links(&self.recipe_listings(profession)?).await?;
        tracing::info!("Found {} {} recipes", links.len(), profession);

        let mut recipes = self
            .assemble("recipes", links, recipe_from_pages as BuildFn<Recipe>)
            .await?;
        sort_recipes(&mut recipes);
        apply_name_overrides(&mut recipes, overrides);
        Ok(recipes)
    }

    /// Scrapes every buff item of a category as NQ and HQ records
    pub async fn scrape_items(
        &self,
        category: ItemCategory,
        overrides: &LanguageOverrides,
    ) -> Result<Vec<Item>> {
        tracing::info!("Scraping {} items", category);
        let links = self
            .collect_links(std::slice::from_ref(&self.item_listing(category)?))
            .await?;
        tracing::info!("Found {} {} items", links.len(), category);

        let mut items: Vec<Item> = self
            .assemble("items", links, items_from_pages as BuildFn<Vec<Item>>)
            .await?
            .into_iter()
            .flatten()
            .collect();
        sort_items(&mut items);
        apply_name_overrides(&mut items, overrides);
        Ok(items)
    }

    /// Scrapes each class in turn, then the buff item categories
    ///
    /// Each catalog is written to the output directory as soon as it is
    /// complete; a failing catalog stops the run before anything of it is
    /// written. Returns the written files.
    pub async fn scrape_and_write(
        &self,
        professions: &[Profession],
        buffs: bool,
        overrides: &LanguageOverrides,
    ) -> Result<Vec<PathBuf>> {
        let output_dir = &self.ctx.config.output.directory;
        let mut written = Vec::new();

        for &profession in professions {
            let recipes = self.scrape_recipes(profession, overrides).await?;
            written.push(write_catalog(output_dir, profession.name(), &recipes)?);
        }

        if buffs {
            for category in ItemCategory::ALL {
                let items = self.scrape_items(category, overrides).await?;
                written.push(write_catalog(output_dir, category.name(), &items)?);
            }
        }

        Ok(written)
    }

    fn listing_url(&self, path: &str) -> Result<String> {
        let primary = self.ctx.config.primary_locale().ok_or_else(|| {
            ConfigError::Validation(format!("locale '{}' is not configured", PRIMARY_LOCALE))
        })?;
        Ok(locale_url(primary, path)?.into())
    }

    /// Walks all listings concurrently, keeping the first occurrence of each link
    async fn collect_links(&self, listings: &[FetchKey]) -> Result<Vec<String>> {
        let ctx = &self.ctx;
        let pages = try_join_all(
            listings
                .iter()
                .map(|listing| walk(&ctx.fetcher, ctx.extractor.as_ref(), listing)),
        )
        .await?;

        let mut seen = HashSet::new();
        let links: Vec<String> = pages
            .into_iter()
            .flatten()
            .filter(|link| seen.insert(link.clone()))
            .collect();
        Ok(links)
    }

    /// Fetches and builds every entity concurrently
    ///
    /// The first failing entity aborts all remaining tasks.
    async fn assemble<T: Send + 'static>(
        &self,
        label: &'static str,
        links: Vec<String>,
        build: BuildFn<T>,
    ) -> Result<Vec<T>> {
        let total = links.len();
        let report_every = (total / 10).max(1);

        let mut tasks = JoinSet::new();
        for link in links {
            let ctx = Arc::clone(&self.ctx);
            tasks.spawn(async move {
                let pages = fetch_entity_pages(&ctx.fetcher, &ctx.config.locales, &link).await?;
                build(ctx.extractor.as_ref(), &pages)
            });
        }

        let mut records = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined? {
                Ok(record) => records.push(record),
                Err(e) => {
                    tasks.abort_all();
                    return Err(e);
                }
            }

            let done = records.len();
            if done % report_every == 0 || done == total {
                tracing::info!("Progress: {}/{} {}", done, total, label);
            }
        }

        Ok(records)
    }
}
