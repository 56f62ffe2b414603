//! Multi-locale entity fetching

use crate::cache::FetchKey;
use crate::config::LocaleEntry;
use crate::crawler::Fetcher;
use crate::extract::{EntityPages, LocaleDocument};
use crate::{Result, ScrapeError};
use futures::future::try_join_all;
use url::Url;

/// Resolves a relative entity link against a locale's origin
pub fn locale_url(locale: &LocaleEntry, link: &str) -> Result<Url> {
    Ok(Url::parse(&locale.base_url)?.join(link)?)
}

/// Fetches one entity's page from every configured locale
///
/// Locales are fetched concurrently and returned in configured order. The
/// first failing locale fails the whole entity.
pub async fn fetch_entity_pages(
    fetcher: &Fetcher,
    locales: &[LocaleEntry],
    link: &str,
) -> Result<EntityPages> {
    let documents = try_join_all(locales.iter().map(|locale| async move {
        let url = locale_url(locale, link)?;
        let body = fetcher.fetch(&FetchKey::new(url.as_str())).await?;
        Ok::<_, ScrapeError>(LocaleDocument {
            locale: locale.code.clone(),
            url: url.into(),
            body,
        })
    }))
    .await?;

    Ok(EntityPages {
        link: link.to_string(),
        documents,
    })
}
