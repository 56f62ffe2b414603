//! Catalog targets and output records
//!
//! A scrape run targets crafting professions (one recipe catalog each) and buff
//! item categories (one item catalog each).

mod entity;
mod names;

pub use entity::{sort_items, sort_recipes, Item, ItemBonuses, Localized, LocalizedName, Recipe};
pub use names::{apply_name_overrides, LanguageOverrides};

use crate::ScrapeError;
use std::fmt;
use std::str::FromStr;

/// Highest base level covered by the level-range listing categories
pub const MAX_LEVEL: u32 = 80;

/// Number of bonus (non level-range) recipe listing categories, `c1..=c7`
pub const BONUS_RECIPE_CATEGORIES: u32 = 7;

/// `category2` value selecting consumable items in the item listing
pub const ITEM_LISTING_CATEGORY: u32 = 5;

/// Crafting professions, in the order the listing endpoint indexes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Profession {
    Carpenter,
    Blacksmith,
    Armorer,
    Goldsmith,
    Leatherworker,
    Weaver,
    Alchemist,
    Culinarian,
}

impl Profession {
    pub const ALL: [Profession; 8] = [
        Profession::Carpenter,
        Profession::Blacksmith,
        Profession::Armorer,
        Profession::Goldsmith,
        Profession::Leatherworker,
        Profession::Weaver,
        Profession::Alchemist,
        Profession::Culinarian,
    ];

    /// The `category2` value for this profession's recipe listing
    pub fn listing_index(self) -> u32 {
        self as u32
    }

    /// Capitalized name, also used as the output file stem
    pub fn name(self) -> &'static str {
        match self {
            Profession::Carpenter => "Carpenter",
            Profession::Blacksmith => "Blacksmith",
            Profession::Armorer => "Armorer",
            Profession::Goldsmith => "Goldsmith",
            Profession::Leatherworker => "Leatherworker",
            Profession::Weaver => "Weaver",
            Profession::Alchemist => "Alchemist",
            Profession::Culinarian => "Culinarian",
        }
    }

    /// Parses a list of class names, expanding `all`, keeping first occurrences
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Profession>, ScrapeError> {
        let mut professions = Vec::new();
        for name in names {
            let name = name.as_ref();
            let parsed: Vec<Profession> = if name.eq_ignore_ascii_case("all") {
                Profession::ALL.to_vec()
            } else {
                vec![name.parse()?]
            };
            for profession in parsed {
                if !professions.contains(&profession) {
                    professions.push(profession);
                }
            }
        }
        Ok(professions)
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profession {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profession::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScrapeError::UnknownClass(s.to_string()))
    }
}

/// Listing sub-categories that together cover every recipe of a profession
///
/// Level ranges `1-5`, `6-10`, ... up to [`MAX_LEVEL`] are addressed by their
/// index; the bonus categories are `c1` through `c7`.
pub fn recipe_subcategories() -> Vec<String> {
    let level_ranges = (1..MAX_LEVEL).step_by(5).count();
    (0..level_ranges)
        .map(|index| index.to_string())
        .chain((1..=BONUS_RECIPE_CATEGORIES).map(|cat| format!("c{}", cat)))
        .collect()
}

/// Buff item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemCategory {
    Medicine,
    Meal,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 2] = [ItemCategory::Medicine, ItemCategory::Meal];

    /// The `category3` value for this category's item listing
    pub fn listing_id(self) -> u32 {
        match self {
            ItemCategory::Medicine => 44,
            ItemCategory::Meal => 46,
        }
    }

    /// Display name, also used as the output file stem
    pub fn name(self) -> &'static str {
        match self {
            ItemCategory::Medicine => "Medicine",
            ItemCategory::Meal => "Meal",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
