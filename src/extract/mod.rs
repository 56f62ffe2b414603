//! Page data extraction and normalization
//!
//! Extraction is split in two layers:
//! - a [`PageExtractor`] reads raw field text out of one page layout
//!   (the site-specific, brittle part)
//! - the normalizer turns raw fields into [`Recipe`](crate::Recipe) and
//!   [`Item`](crate::Item) records: identifiers, level adjustment,
//!   characteristics, item bonuses and per-locale names
//!
//! Every field except the display name is read once from the primary locale's
//! page; only the name is read from each locale.

mod html;
mod level;
mod normalize;

pub use html::LodestoneExtractor;
pub use level::{adjust_level, level_offsets, LevelAdjustment};
pub use normalize::{
    extract_db_id, items_from_pages, parse_bonuses, parse_characteristics, recipe_from_pages,
    Characteristics,
};

use crate::config::PRIMARY_LOCALE;

/// One page of a paginated listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPage {
    /// Relative entity links, in page order
    pub links: Vec<String>,

    /// Number of entities shown up to and including this page
    pub show_end: u32,

    /// Total number of entities in the listing
    pub total: u32,
}

impl LinkPage {
    /// Whether this page is the last one of its listing
    pub fn is_last(&self) -> bool {
        self.show_end >= self.total
    }
}

/// Raw recipe fields read from a detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFields {
    /// Text of the embed code block, e.g. `[db:recipe=0a1b2c3d4e5]`
    pub embed_code: Option<String>,

    /// Text of the level indicator
    pub level: Option<String>,

    /// Number of star markers next to the level indicator
    pub star_count: u32,

    /// `(label, value)` pairs from the labelled craft data list
    pub craft_data: Vec<(String, String)>,

    /// Trimmed lines of the characteristics block
    pub characteristics: Vec<String>,
}

/// Raw item fields read from a detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFields {
    pub embed_code: Option<String>,

    /// Text of the normal-quality effect block
    pub nq_text: String,

    /// Text of the high-quality effect block
    pub hq_text: String,
}

/// Reads raw fields out of a particular page layout
pub trait PageExtractor: Send + Sync {
    /// Parses one listing page
    fn link_page(&self, body: &str) -> Result<LinkPage, String>;

    fn recipe_fields(&self, body: &str) -> RecipeFields;

    fn item_fields(&self, body: &str) -> ItemFields;

    /// The page's display name heading, trimmed
    fn display_name(&self, body: &str) -> Option<String>;
}

/// A fetched detail page for one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleDocument {
    pub locale: String,
    pub url: String,
    pub body: String,
}

/// Every locale's page for one entity, in configured locale order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityPages {
    /// The relative link the pages were fetched from
    pub link: String,
    pub documents: Vec<LocaleDocument>,
}

impl EntityPages {
    /// The primary locale's page
    pub fn primary(&self) -> Option<&LocaleDocument> {
        self.get(PRIMARY_LOCALE)
    }

    pub fn get(&self, locale: &str) -> Option<&LocaleDocument> {
        self.documents.iter().find(|d| d.locale == locale)
    }
}
