//! Raw field normalization into catalog records

use crate::catalog::{Item, ItemBonuses, LocalizedName, Recipe};
use crate::extract::level::adjust_level;
use crate::extract::{EntityPages, LocaleDocument, PageExtractor};
use crate::{Result, ScrapeError};
use regex::Regex;
use std::sync::LazyLock;

static EMBED_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[db:[a-z]+=([0-9a-f]+)\]").expect("hardcoded regex is valid"));

static ASPECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Aspect: (.+)").expect("hardcoded regex is valid"));

static RECIPE_CRAFTSMANSHIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Craftsmanship (?:Required|Recommended): ([0-9]+)")
        .expect("hardcoded regex is valid")
});

static RECIPE_CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Control (?:Required|Recommended): ([0-9]+)").expect("hardcoded regex is valid")
});

static ITEM_CRAFTSMANSHIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Craftsmanship \+([0-9]+)% \(Max ([0-9]+)\)").expect("hardcoded regex is valid")
});

static ITEM_CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Control \+([0-9]+)% \(Max ([0-9]+)\)").expect("hardcoded regex is valid")
});

static ITEM_CP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"CP \+([0-9]+)% \(Max ([0-9]+)\)").expect("hardcoded regex is valid")
});

/// Labelled craft data rows, all required
const CRAFT_DATA_FIELDS: [(&str, &str); 3] = [
    ("Difficulty", "difficulty"),
    ("Durability", "durability"),
    ("Maximum Quality", "maxQuality"),
];

/// Optional values read from a recipe's characteristics block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Characteristics {
    pub aspect: Option<String>,
    pub suggested_craftsmanship: Option<u32>,
    pub suggested_control: Option<u32>,
}

/// Extracts the hexadecimal database id from an embed code
pub fn extract_db_id(url: &str, embed_code: Option<&str>) -> Result<String> {
    embed_code
        .and_then(|code| EMBED_CODE_RE.captures(code.trim()))
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| {
            tracing::error!("Embed id not found on {}", url);
            ScrapeError::IdentifierNotFound {
                url: url.to_string(),
            }
        })
}

/// Matches characteristics lines; a later matching line overrides an earlier one
pub fn parse_characteristics<S: AsRef<str>>(lines: &[S]) -> Characteristics {
    let mut parsed = Characteristics::default();
    for line in lines {
        let line = line.as_ref().trim();
        if let Some(captures) = ASPECT_RE.captures(line) {
            parsed.aspect = Some(captures[1].trim().to_string());
        }
        if let Some(value) = capture_number(&RECIPE_CRAFTSMANSHIP_RE, line) {
            parsed.suggested_craftsmanship = Some(value);
        }
        if let Some(value) = capture_number(&RECIPE_CONTROL_RE, line) {
            parsed.suggested_control = Some(value);
        }
    }
    parsed
}

/// Parses craftsmanship, control and CP bonuses from an effect block
///
/// When an attribute appears more than once the last occurrence wins.
pub fn parse_bonuses(text: &str) -> ItemBonuses {
    let mut bonuses = ItemBonuses::default();
    if let Some((percent, value)) = capture_bonus(&ITEM_CRAFTSMANSHIP_RE, text) {
        bonuses.craftsmanship_percent = Some(percent);
        bonuses.craftsmanship_value = Some(value);
    }
    if let Some((percent, value)) = capture_bonus(&ITEM_CONTROL_RE, text) {
        bonuses.control_percent = Some(percent);
        bonuses.control_value = Some(value);
    }
    if let Some((percent, value)) = capture_bonus(&ITEM_CP_RE, text) {
        bonuses.cp_percent = Some(percent);
        bonuses.cp_value = Some(value);
    }
    bonuses
}

/// Builds a recipe from every locale's page
pub fn recipe_from_pages(extractor: &dyn PageExtractor, pages: &EntityPages) -> Result<Recipe> {
    let primary = primary_document(pages)?;
    let url = primary.url.as_str();
    let fields = extractor.recipe_fields(&primary.body);

    let id = extract_db_id(url, fields.embed_code.as_deref())?;
    let level_text = fields.level.as_deref().ok_or_else(|| missing(url, "baseLevel"))?;
    let base_level = parse_number(url, "baseLevel", level_text)?;

    let mut craft_data = [0u32; CRAFT_DATA_FIELDS.len()];
    for (slot, (label, field)) in craft_data.iter_mut().zip(CRAFT_DATA_FIELDS) {
        let value = fields
            .craft_data
            .iter()
            .find(|(l, _)| l.trim() == label)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| missing(url, field))?;
        *slot = parse_number(url, field, value)?;
    }
    let [difficulty, durability, max_quality] = craft_data;

    let adjustment = adjust_level(base_level, fields.star_count, difficulty)?;
    let characteristics = parse_characteristics(&fields.characteristics);

    Ok(Recipe {
        id,
        name: localized_names(extractor, pages)?,
        base_level,
        level: adjustment.level,
        difficulty,
        durability,
        max_quality,
        stars: adjustment.stars.filter(|&stars| stars > 0),
        aspect: characteristics.aspect,
        suggested_craftsmanship: characteristics.suggested_craftsmanship,
        suggested_control: characteristics.suggested_control,
    })
}

/// Builds the normal- and high-quality records of a buff item
///
/// Returns no records when neither effect block carries a crafting bonus: the
/// listing filter also matches consumables that are not buffs.
pub fn items_from_pages(extractor: &dyn PageExtractor, pages: &EntityPages) -> Result<Vec<Item>> {
    let primary = primary_document(pages)?;
    let fields = extractor.item_fields(&primary.body);
    let id = extract_db_id(&primary.url, fields.embed_code.as_deref())?;

    let nq = parse_bonuses(fields.nq_text.trim());
    let hq = parse_bonuses(fields.hq_text.trim());
    if nq.is_empty() && hq.is_empty() {
        tracing::debug!("{} has no crafting bonuses, skipping", primary.url);
        return Ok(Vec::new());
    }

    let name = localized_names(extractor, pages)?;
    Ok(vec![
        Item {
            id: id.clone(),
            name: name.clone(),
            hq: false,
            bonuses: nq,
        },
        Item {
            id,
            name,
            hq: true,
            bonuses: hq,
        },
    ])
}

fn localized_names(extractor: &dyn PageExtractor, pages: &EntityPages) -> Result<LocalizedName> {
    pages
        .documents
        .iter()
        .map(|document| {
            extractor
                .display_name(&document.body)
                .map(|name| (document.locale.clone(), name))
                .ok_or_else(|| missing(&document.url, "name"))
        })
        .collect()
}

fn primary_document(pages: &EntityPages) -> Result<&LocaleDocument> {
    pages.primary().ok_or_else(|| ScrapeError::MissingField {
        url: pages.link.clone(),
        field: "primary locale page",
    })
}

fn capture_number(re: &Regex, line: &str) -> Option<u32> {
    re.captures(line)?.get(1)?.as_str().parse().ok()
}

fn capture_bonus(re: &Regex, text: &str) -> Option<(u32, u32)> {
    let captures = re.captures_iter(text).last()?;
    let percent = captures.get(1)?.as_str().parse().ok()?;
    let value = captures.get(2)?.as_str().parse().ok()?;
    Some((percent, value))
}

fn parse_number(url: &str, field: &'static str, text: &str) -> Result<u32> {
    text.trim()
        .parse()
        .map_err(|_| ScrapeError::InvalidNumber {
            url: url.to_string(),
            field,
            value: text.to_string(),
        })
}

fn missing(url: &str, field: &'static str) -> ScrapeError {
    tracing::error!("Missing field '{}' on {}", field, url);
    ScrapeError::MissingField {
        url: url.to_string(),
        field,
    }
}
