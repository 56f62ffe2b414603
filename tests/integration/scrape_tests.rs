//! Integration tests for the scraper
//!
//! These tests use wiremock to create mock Lodestone servers and test the
//! fetcher's retry contract, pagination and full catalog assembly.

use lodestone_scraper::cache::{DiskCache, FetchKey, NoCache, ResponseCache};
use lodestone_scraper::catalog::LanguageOverrides;
use lodestone_scraper::config::{LocaleEntry, ScraperConfig};
use lodestone_scraper::crawler::{build_http_client, walk};
use lodestone_scraper::extract::LodestoneExtractor;
use lodestone_scraper::{Coordinator, Fetcher, ItemCategory, Profession, RetryPolicy, ScrapeError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECIPE_LIST: &str = "/lodestone/playguide/db/recipe/";
const ITEM_LIST: &str = "/lodestone/playguide/db/item/";

/// Creates a fetcher with no delays between attempts
fn test_fetcher(cache: Arc<dyn ResponseCache>, max_failures: u32) -> Fetcher {
    let client = build_http_client(&ScraperConfig::default().fetch).unwrap();
    Fetcher::with_parts(
        client,
        cache,
        4,
        RetryPolicy::with_delays(max_failures, Duration::ZERO),
    )
}

fn listing_page(links: &[&str], show_end: u32, total: u32) -> String {
    let rows: String = links
        .iter()
        .map(|link| format!(r#"<div data-ldst-href="{}">entry</div>"#, link))
        .collect();
    format!(
        r#"<html><body>{}
        <span class="show_end">{}</span><span class="total">{}</span>
        </body></html>"#,
        rows, show_end, total
    )
}

fn recipe_page(id: &str, name: &str, level: u32, stars: u32, difficulty: u32) -> String {
    let star_markers = r#"<span class="db-view__star">★</span>"#.repeat(stars as usize);
    format!(
        r#"<html><body>
        <div class="embed_code_txt"><div>[db:recipe={id}]</div></div>
        <h2 class="db-view__item__text__name">{name}</h2>
        <div class="db-view__item__text__level">
            <span class="db-view__item__text__level__num">{level}</span>{star_markers}
        </div>
        <ul class="db-view__recipe__craftdata">
            <li><span>Difficulty</span>{difficulty}</li>
            <li><span>Durability</span>40</li>
            <li><span>Maximum Quality</span>800</li>
        </ul>
        <dl class="db-view__recipe__crafting_conditions">
            <dt>Characteristics</dt>
            <dd>Craftsmanship Recommended: 120<br>Control Required: 0</dd>
        </dl>
        </body></html>"#
    )
}

fn item_page(id: &str, name: &str, nq: &str, hq: &str) -> String {
    format!(
        r#"<html><body>
        <div class="embed_code_txt"><div>[db:item={id}]</div></div>
        <h2 class="db-view__item__text__name">{name}</h2>
        <ul class="sys_nq_element"><li>{nq}</li></ul>
        <ul class="sys_hq_element"><li>{hq}</li></ul>
        </body></html>"#
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

/// A configuration whose locales are served by the given mock servers
fn test_config(locales: &[(&str, &MockServer)], cache_dir: &TempDir) -> ScraperConfig {
    let mut config = ScraperConfig::default();
    config.locales = locales
        .iter()
        .map(|(code, server)| LocaleEntry {
            code: code.to_string(),
            base_url: server.uri(),
        })
        .collect();
    config.fetch.cache_dir = cache_dir.path().join("cache");
    config.output.directory = cache_dir.path().join("out");
    config
}

fn test_coordinator(config: ScraperConfig) -> Coordinator {
    let fetcher = test_fetcher(Arc::new(NoCache), 2);
    Coordinator::with_parts(config, fetcher, Arc::new(LodestoneExtractor::new()))
}

#[tokio::test]
async fn test_four_failures_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(4)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(Arc::new(NoCache), 5);
    let body = fetcher
        .fetch(&FetchKey::new(format!("{}/page", server.uri())))
        .await
        .unwrap();

    assert_eq!(body, "ok");
    assert_eq!(server.received_requests().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_five_failures_are_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(Arc::new(NoCache), 5);
    let result = fetcher
        .fetch(&FetchKey::new(format!("{}/page", server.uri())))
        .await;

    assert!(matches!(
        result,
        Err(ScrapeError::FetchExhausted { attempts: 5, .. })
    ));
    assert_eq!(server.received_requests().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_rate_limits_do_not_spend_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(10)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(Arc::new(NoCache), 5);
    let body = fetcher
        .fetch(&FetchKey::new(format!("{}/page", server.uri())))
        .await
        .unwrap();

    assert_eq!(body, "finally");
    assert_eq!(server.received_requests().await.unwrap().len(), 11);
}

#[tokio::test]
async fn test_cache_hit_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("cached body"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cache = || Arc::new(DiskCache::new(dir.path(), chrono::Duration::hours(12)));
    let url = format!("{}/page", server.uri());

    let fetcher = test_fetcher(cache(), 1);
    let key = FetchKey::new(url.as_str()).param("page", 2);
    assert_eq!(fetcher.fetch(&key).await.unwrap(), "cached body");
    assert_eq!(fetcher.fetch(&key).await.unwrap(), "cached body");

    // A new fetcher over the same directory is served from disk too
    let fetcher = test_fetcher(cache(), 1);
    let key = FetchKey::with_params(url.as_str(), [("page", 2)]);
    assert_eq!(fetcher.fetch(&key).await.unwrap(), "cached body");
}

#[tokio::test]
async fn test_walk_fetches_each_page_once_in_order() {
    let server = MockServer::start().await;
    let pages = [
        (listing_page(&["/r/1/", "/r/2/"], 2, 5), "1"),
        (listing_page(&["/r/3/", "/r/4/"], 4, 5), "2"),
        (listing_page(&["/r/5/"], 5, 5), "3"),
    ];
    for (body, page) in pages {
        Mock::given(method("GET"))
            .and(path(RECIPE_LIST))
            .and(query_param("category2", "7"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let fetcher = test_fetcher(Arc::new(NoCache), 5);
    let listing = FetchKey::new(format!("{}{}", server.uri(), RECIPE_LIST)).param("category2", 7);
    let links = walk(&fetcher, &LodestoneExtractor, &listing).await.unwrap();

    assert_eq!(links, vec!["/r/1/", "/r/2/", "/r/3/", "/r/4/", "/r/5/"]);
}

#[tokio::test]
async fn test_walk_single_page_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECIPE_LIST))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[], 0, 0)))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher(Arc::new(NoCache), 5);
    let listing = FetchKey::new(format!("{}{}", server.uri(), RECIPE_LIST));
    assert!(walk(&fetcher, &LodestoneExtractor, &listing)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_walk_stalled_listing_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECIPE_LIST))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_page(&["/r/1/"], 50, 100)),
        )
        .mount(&server)
        .await;

    let fetcher = test_fetcher(Arc::new(NoCache), 2);
    let listing = FetchKey::new(format!("{}{}", server.uri(), RECIPE_LIST));
    let result = walk(&fetcher, &LodestoneExtractor, &listing).await;

    assert!(matches!(
        result,
        Err(ScrapeError::PaginationStalled {
            show_end: 50,
            total: 100,
            ..
        })
    ));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_walk_malformed_listing_spends_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cache = Arc::new(DiskCache::new(dir.path(), chrono::Duration::hours(12)));
    let fetcher = test_fetcher(cache.clone(), 2);
    let listing = FetchKey::new(format!("{}{}", server.uri(), RECIPE_LIST));

    assert!(matches!(
        walk(&fetcher, &LodestoneExtractor, &listing).await,
        Err(ScrapeError::FetchExhausted { attempts: 2, .. })
    ));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    assert!(cache.lookup(&listing.param("page", 1)).is_none());
}

#[tokio::test]
async fn test_walk_recovers_from_maintenance_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECIPE_LIST))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(RECIPE_LIST))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_page(&["/r/1/", "/r/2/"], 2, 2)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cache = || Arc::new(DiskCache::new(dir.path(), chrono::Duration::hours(12)));
    let listing = FetchKey::new(format!("{}{}", server.uri(), RECIPE_LIST));

    let links = walk(&test_fetcher(cache(), 5), &LodestoneExtractor, &listing)
        .await
        .unwrap();
    assert_eq!(links, vec!["/r/1/", "/r/2/"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    // Only the healthy listing was cached, so a later run reads it from disk
    let links = walk(&test_fetcher(cache(), 5), &LodestoneExtractor, &listing)
        .await
        .unwrap();
    assert_eq!(links, vec!["/r/1/", "/r/2/"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_walk_refetches_cached_maintenance_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECIPE_LIST))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["/r/1/"], 1, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cache = Arc::new(DiskCache::new(dir.path(), chrono::Duration::hours(12)));
    let listing = FetchKey::new(format!("{}{}", server.uri(), RECIPE_LIST));
    let first_page = listing.clone().param("page", 1);
    cache.store(&first_page, "<html>maintenance</html>");

    let links = walk(&test_fetcher(cache.clone(), 5), &LodestoneExtractor, &listing)
        .await
        .unwrap();
    assert_eq!(links, vec!["/r/1/"]);
    assert!(cache.lookup(&first_page).unwrap().contains("show_end"));
}

#[tokio::test]
async fn test_scrape_recipes_end_to_end() {
    let en = MockServer::start().await;
    let de = MockServer::start().await;

    // Carpenter is listing index 0; "c1" repeats a level-range link
    Mock::given(method("GET"))
        .and(path(RECIPE_LIST))
        .and(query_param("category2", "0"))
        .and(query_param("category3", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &["/lodestone/playguide/db/recipe/aaa/", "/lodestone/playguide/db/recipe/bbb/"],
            2,
            2,
        )))
        .expect(1)
        .mount(&en)
        .await;
    Mock::given(method("GET"))
        .and(path(RECIPE_LIST))
        .and(query_param("category3", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &["/lodestone/playguide/db/recipe/bbb/", "/lodestone/playguide/db/recipe/ccc/"],
            2,
            2,
        )))
        .expect(1)
        .mount(&en)
        .await;
    Mock::given(method("GET"))
        .and(path(RECIPE_LIST))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[], 0, 0)))
        .expect(21)
        .mount(&en)
        .await;

    let recipes = [
        ("aaa", "Maple Lumber", "Ahornholz", 10, 0, 30),
        ("bbb", "Bronze Ingot", "Bronzebarren", 50, 2, 1200),
        ("ccc", "Ash Lumber", "Eschenholz", 5, 0, 20),
    ];
    for (id, en_name, de_name, level, stars, difficulty) in recipes {
        let page_path = format!("/lodestone/playguide/db/recipe/{}/", id);
        mount_page(&en, &page_path, recipe_page(id, en_name, level, stars, difficulty), 1).await;
        mount_page(&de, &page_path, recipe_page(id, de_name, level, stars, difficulty), 1).await;
    }

    let dir = TempDir::new().unwrap();
    let coordinator = test_coordinator(test_config(&[("en", &en), ("de", &de)], &dir));

    let mut overrides = LanguageOverrides::new();
    overrides.insert(
        "ko",
        HashMap::from([("Maple Lumber".to_string(), "단풍나무 목재".to_string())]),
    );

    let recipes = coordinator
        .scrape_recipes(Profession::Carpenter, &overrides)
        .await
        .unwrap();

    let ids: Vec<&str> = recipes.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["ccc", "aaa", "bbb"]);

    let bronze = &recipes[2];
    assert_eq!(bronze.base_level, 50);
    assert_eq!(bronze.level, 70);
    assert_eq!(bronze.stars, Some(2));
    assert_eq!(bronze.name["de"], "Bronzebarren");
    assert_eq!(bronze.suggested_craftsmanship, Some(120));
    assert_eq!(bronze.suggested_control, Some(0));
    assert_eq!(bronze.name["ko"], "Bronze Ingot");

    assert_eq!(recipes[1].name["ko"], "단풍나무 목재");
    assert_eq!(recipes[0].stars, None);
}

#[tokio::test]
async fn test_scrape_items_end_to_end() {
    let en = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ITEM_LIST))
        .and(query_param("category2", "5"))
        .and(query_param("category3", "46"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &[
                "/lodestone/playguide/db/item/tea/",
                "/lodestone/playguide/db/item/soup/",
                "/lodestone/playguide/db/item/pie/",
            ],
            3,
            3,
        )))
        .expect(1)
        .mount(&en)
        .await;

    let items = [
        ("tea", "Chamomile Tea", "Control +4% (Max 21)", "Control +5% (Max 26)"),
        ("soup", "Potato Soup", "Vitality +8% (Max 120)", "Vitality +10% (Max 150)"),
        ("pie", "Apple Pie", "CP +6% (Max 15)", "CP +8% (Max 19)"),
    ];
    for (id, name, nq, hq) in items {
        mount_page(
            &en,
            &format!("/lodestone/playguide/db/item/{}/", id),
            item_page(id, name, nq, hq),
            1,
        )
        .await;
    }

    let dir = TempDir::new().unwrap();
    let coordinator = test_coordinator(test_config(&[("en", &en)], &dir));
    let items = coordinator
        .scrape_items(ItemCategory::Meal, &LanguageOverrides::new())
        .await
        .unwrap();

    let summary: Vec<(&str, bool)> = items.iter().map(|i| (i.id.as_str(), i.hq)).collect();
    assert_eq!(
        summary,
        vec![("pie", false), ("pie", true), ("tea", false), ("tea", true)]
    );
    assert_eq!(items[0].bonuses.cp_value, Some(15));
    assert_eq!(items[3].bonuses.control_percent, Some(5));
}

#[tokio::test]
async fn test_broken_entity_aborts_scrape() {
    let en = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ITEM_LIST))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &["/lodestone/playguide/db/item/broken/"],
            1,
            1,
        )))
        .mount(&en)
        .await;
    mount_page(
        &en,
        "/lodestone/playguide/db/item/broken/",
        "<html><body><h2 class=\"db-view__item__text__name\">Broken</h2></body></html>"
            .to_string(),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let coordinator = test_coordinator(test_config(&[("en", &en)], &dir));
    let result = coordinator
        .scrape_items(ItemCategory::Medicine, &LanguageOverrides::new())
        .await;

    assert!(matches!(
        result,
        Err(ScrapeError::IdentifierNotFound { .. })
    ));
}

#[tokio::test]
async fn test_unsupported_stars_abort_before_any_catalog_is_written() {
    let en = MockServer::start().await;
    let link = "/lodestone/playguide/db/recipe/overflow/";

    Mock::given(method("GET"))
        .and(path(RECIPE_LIST))
        .and(query_param("category2", "0"))
        .and(query_param("category3", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[link], 1, 1)))
        .mount(&en)
        .await;
    Mock::given(method("GET"))
        .and(path(RECIPE_LIST))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[], 0, 0)))
        .mount(&en)
        .await;
    mount_page(&en, link, recipe_page("overflow", "Star Ingot", 50, 5, 9000), 1).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&[("en", &en)], &dir);
    let output_dir = config.output.directory.clone();
    let coordinator = test_coordinator(config);

    let result = coordinator
        .scrape_and_write(&[Profession::Carpenter], true, &LanguageOverrides::new())
        .await;

    assert!(matches!(
        result,
        Err(ScrapeError::UnsupportedStars {
            base_level: 50,
            stars: 5
        })
    ));
    assert!(!output_dir.join("Carpenter.json").exists());
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_scrape_and_write_writes_each_catalog() {
    let en = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[], 0, 0)))
        .mount(&en)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&[("en", &en)], &dir);
    let output_dir = config.output.directory.clone();
    let coordinator = test_coordinator(config);

    let written = coordinator
        .scrape_and_write(&[Profession::Alchemist], true, &LanguageOverrides::new())
        .await
        .unwrap();

    assert_eq!(
        written,
        vec![
            output_dir.join("Alchemist.json"),
            output_dir.join("Medicine.json"),
            output_dir.join("Meal.json"),
        ]
    );
    assert!(written.iter().all(|path| path.exists()));
}
