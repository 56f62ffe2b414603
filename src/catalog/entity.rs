//! Normalized output records
//!
//! Optional fields are `Option`s that are left out of the serialized record
//! when unset, so "not specified" and "specified as zero" stay distinct.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display names keyed by locale code
pub type LocalizedName = BTreeMap<String, String>;

/// Records carrying a per-locale display name
pub trait Localized {
    fn names(&self) -> &LocalizedName;
    fn names_mut(&mut self) -> &mut LocalizedName;

    /// The English display name, or an empty string when missing
    fn english_name(&self) -> &str {
        self.names()
            .get(crate::config::PRIMARY_LOCALE)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// A crafting recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: LocalizedName,
    #[serde(rename = "baseLevel")]
    pub base_level: u32,
    pub level: u32,
    pub difficulty: u32,
    pub durability: u32,
    #[serde(rename = "maxQuality")]
    pub max_quality: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect: Option<String>,
    #[serde(
        rename = "suggestedCraftsmanship",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub suggested_craftsmanship: Option<u32>,
    #[serde(
        rename = "suggestedControl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub suggested_control: Option<u32>,
}

/// A consumable buff item in its normal- or high-quality variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: LocalizedName,
    pub hq: bool,
    #[serde(flatten)]
    pub bonuses: ItemBonuses,
}

/// Crafting stat bonuses granted by an item
///
/// Each attribute's percent and value are set together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBonuses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub craftsmanship_percent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub craftsmanship_value: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_percent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_value: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp_percent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp_value: Option<u32>,
}

impl ItemBonuses {
    pub fn is_empty(&self) -> bool {
        self.craftsmanship_percent.is_none()
            && self.control_percent.is_none()
            && self.cp_percent.is_none()
    }
}

impl Localized for Recipe {
    fn names(&self) -> &LocalizedName {
        &self.name
    }

    fn names_mut(&mut self) -> &mut LocalizedName {
        &mut self.name
    }
}

impl Localized for Item {
    fn names(&self) -> &LocalizedName {
        &self.name
    }

    fn names_mut(&mut self) -> &mut LocalizedName {
        &mut self.name
    }
}

/// Sorts recipes by level, then English name, then id
pub fn sort_recipes(recipes: &mut [Recipe]) {
    recipes.sort_by(|a, b| {
        a.level
            .cmp(&b.level)
            .then_with(|| a.english_name().cmp(b.english_name()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Sorts items by English name, normal quality before high quality, then id
pub fn sort_items(items: &mut [Item]) {
    items.sort_by(|a, b| {
        a.english_name()
            .cmp(b.english_name())
            .then_with(|| a.hq.cmp(&b.hq))
            .then_with(|| a.id.cmp(&b.id))
    });
}
