//! Listing pagination
//!
//! Listing pages report how many entities have been shown so far (`show_end`)
//! and how many exist (`total`). Pages are walked sequentially from page 1
//! until the last fetched page shows everything.

use crate::cache::FetchKey;
use crate::crawler::Fetcher;
use crate::extract::PageExtractor;
use crate::{Result, ScrapeError};

/// Collects every entity link of a paginated listing, in page order
///
/// `listing` carries the listing URL and its filter parameters; the `page`
/// parameter is set here. A page whose `show_end` does not advance past the
/// previous page's counts against the fetcher's failure budget, so a listing
/// that never progresses cannot loop forever. A page without a listing
/// (a maintenance page, say) is retried by the fetcher and never cached.
pub async fn walk(
    fetcher: &Fetcher,
    extractor: &dyn PageExtractor,
    listing: &FetchKey,
) -> Result<Vec<String>> {
    let mut links = Vec::new();
    let mut page = 1u32;
    let mut last_show_end = 0u32;
    let mut stalls = 0u32;

    loop {
        let key = listing.clone().param("page", page);
        let parsed = fetcher
            .fetch_with(&key, |body| extractor.link_page(body))
            .await?;

        tracing::debug!(
            "{}: {} links, {} of {}",
            key,
            parsed.links.len(),
            parsed.show_end,
            parsed.total
        );

        if parsed.is_last() {
            links.extend(parsed.links);
            return Ok(links);
        }

        if page > 1 && parsed.show_end <= last_show_end {
            stalls += 1;
            tracing::warn!(
                "Listing {} did not advance (show_end {} of {})",
                key,
                parsed.show_end,
                parsed.total
            );
            if fetcher.retry_policy().is_exhausted(stalls) {
                return Err(ScrapeError::PaginationStalled {
                    url: key.to_string(),
                    show_end: parsed.show_end,
                    total: parsed.total,
                });
            }
        }

        last_show_end = last_show_end.max(parsed.show_end);
        links.extend(parsed.links);
        page += 1;
    }
}
