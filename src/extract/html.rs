//! Lodestone HTML layout
//!
//! Reads raw field text from Lodestone listing and detail pages using CSS
//! selectors. Nothing here interprets values; see the normalizer for that.

use crate::extract::{ItemFields, LinkPage, PageExtractor, RecipeFields};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("hardcoded selector is valid")
}

static LISTING_LINK: LazyLock<Selector> = LazyLock::new(|| selector("div[data-ldst-href]"));
static SHOW_END: LazyLock<Selector> = LazyLock::new(|| selector("span.show_end"));
static TOTAL: LazyLock<Selector> = LazyLock::new(|| selector("span.total"));
static EMBED_CODE: LazyLock<Selector> = LazyLock::new(|| selector("div.embed_code_txt div"));
static LEVEL_NUM: LazyLock<Selector> =
    LazyLock::new(|| selector("span.db-view__item__text__level__num"));
static LEVEL_STAR: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"div.db-view__item__text__level span[class*="star"]"#));
static CRAFT_DATA_ROW: LazyLock<Selector> =
    LazyLock::new(|| selector("ul.db-view__recipe__craftdata > li"));
static CRAFT_CONDITIONS: LazyLock<Selector> =
    LazyLock::new(|| selector("dl.db-view__recipe__crafting_conditions"));
static NQ_BLOCK: LazyLock<Selector> = LazyLock::new(|| selector("ul.sys_nq_element"));
static HQ_BLOCK: LazyLock<Selector> = LazyLock::new(|| selector("ul.sys_hq_element"));
static NAME: LazyLock<Selector> = LazyLock::new(|| selector("h2.db-view__item__text__name"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static DT: LazyLock<Selector> = LazyLock::new(|| selector("dt"));
static DD: LazyLock<Selector> = LazyLock::new(|| selector("dd"));

/// Extractor for the Lodestone database page layout
#[derive(Debug, Default, Clone, Copy)]
pub struct LodestoneExtractor;

impl LodestoneExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl PageExtractor for LodestoneExtractor {
    fn link_page(&self, body: &str) -> Result<LinkPage, String> {
        let document = Html::parse_document(body);

        let links = document
            .select(&LISTING_LINK)
            .filter_map(|element| element.value().attr("data-ldst-href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
            .collect();

        Ok(LinkPage {
            links,
            show_end: counter(&document, &SHOW_END, "show_end")?,
            total: counter(&document, &TOTAL, "total")?,
        })
    }

    fn recipe_fields(&self, body: &str) -> RecipeFields {
        let document = Html::parse_document(body);

        let craft_data = document
            .select(&CRAFT_DATA_ROW)
            .filter_map(|row| {
                let label = row.select(&SPAN).next()?;
                Some((
                    collect_text(label).trim().to_string(),
                    own_text(row).trim().to_string(),
                ))
            })
            .collect();

        RecipeFields {
            embed_code: embed_code(&document),
            level: document
                .select(&LEVEL_NUM)
                .next()
                .map(|element| collect_text(element).trim().to_string()),
            star_count: document.select(&LEVEL_STAR).count() as u32,
            craft_data,
            characteristics: characteristics(&document),
        }
    }

    fn item_fields(&self, body: &str) -> ItemFields {
        let document = Html::parse_document(body);
        ItemFields {
            embed_code: embed_code(&document),
            nq_text: block_text(&document, &NQ_BLOCK),
            hq_text: block_text(&document, &HQ_BLOCK),
        }
    }

    fn display_name(&self, body: &str) -> Option<String> {
        let document = Html::parse_document(body);
        document
            .select(&NAME)
            .map(|heading| own_text(heading).trim().to_string())
            .find(|name| !name.is_empty())
    }
}

/// Text of direct text children only, skipping nested elements
fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect()
}

fn collect_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn counter(document: &Html, selector: &Selector, name: &str) -> Result<u32, String> {
    let text = document
        .select(selector)
        .next()
        .map(collect_text)
        .ok_or_else(|| format!("no {} counter", name))?;
    let digits: String = text.trim().chars().filter(|c| *c != ',').collect();
    digits
        .parse()
        .map_err(|_| format!("invalid {} counter {:?}", name, text.trim()))
}

fn embed_code(document: &Html) -> Option<String> {
    document
        .select(&EMBED_CODE)
        .map(own_text)
        .map(|text| text.trim().to_string())
        .find(|text| text.contains("db:"))
}

/// Lines of every `dd` in the conditions list that has a "Characteristics" term
fn characteristics(document: &Html) -> Vec<String> {
    document
        .select(&CRAFT_CONDITIONS)
        .filter(|list| {
            list.select(&DT)
                .any(|term| collect_text(term).trim() == "Characteristics")
        })
        .flat_map(|list| list.select(&DD).collect::<Vec<_>>())
        .flat_map(|definition| {
            definition
                .children()
                .filter_map(|node| node.value().as_text())
                .map(|text| text.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

fn block_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .map(collect_text)
        .collect::<String>()
        .trim()
        .to_string()
}
