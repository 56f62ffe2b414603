//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for a scrape run, including:
//! - Building the HTTP client with the configured user agent
//! - Serving repeated requests from the response cache
//! - Bounding in-flight requests with a shared semaphore
//! - Retrying rate-limited and failed requests per [`RetryPolicy`]

use crate::cache::{DiskCache, FetchKey, ResponseCache};
use crate::config::{FetchConfig, ScraperConfig};
use crate::crawler::RetryPolicy;
use crate::{Result, ScrapeError};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Outcome of a single network attempt
#[derive(Debug)]
enum Attempt {
    /// 2xx response with its body
    Success(String),

    /// Rate-limited; retry after the given delay without counting a failure
    RateLimited(Duration),

    /// Non-success status, transport error or unreadable body
    Failed(String),
}

/// Builds an HTTP client with proper configuration
///
/// The Lodestone database is served over plain HTTP, so the client does not
/// restrict schemes. Compressed responses are decoded transparently.
pub fn build_http_client(config: &FetchConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited, retrying, cache-backed page fetcher
///
/// Cheap to share: clones use the same client, cache and semaphore, so the
/// concurrency cap holds across every task of a run.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    cache: Arc<dyn ResponseCache>,
    semaphore: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher backed by the configured disk cache
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = build_http_client(&config.fetch)?;
        let cache = DiskCache::new(&config.fetch.cache_dir, config.fetch.cache_expiry());
        Ok(Self::with_parts(
            client,
            Arc::new(cache),
            config.fetch.max_concurrency as usize,
            RetryPolicy::from_config(&config.retry),
        ))
    }

    /// Creates a fetcher from explicit parts
    pub fn with_parts(
        client: Client,
        cache: Arc<dyn ResponseCache>,
        max_concurrency: usize,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            cache,
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            retry,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetches the body for `key`
    ///
    /// Any 2xx body is accepted. See [`Fetcher::fetch_with`] for the flow.
    pub async fn fetch(&self, key: &FetchKey) -> Result<String> {
        self.fetch_with(key, |body| Ok(body.to_string())).await
    }

    /// Fetches the body for `key` and parses it with `parse`
    ///
    /// # Request Flow
    ///
    /// 1. Cache hit that `parse` accepts → return it (no permit taken)
    /// 2. Take a semaphore permit for the duration of one attempt
    /// 3. Handle the outcome per the retry policy; the permit is released
    ///    before any wait
    /// 4. Parse the body; a rejected body counts as a failed attempt
    /// 5. Store the accepted body in the cache, then return the parsed value
    ///
    /// A cached body that `parse` rejects is ignored and refetched, and a
    /// rejected body is never cached.
    ///
    /// # Errors
    ///
    /// `FetchExhausted` once the policy's failure budget is spent. Rate-limit
    /// responses never spend it, so a persistently rate-limited request waits
    /// indefinitely.
    pub async fn fetch_with<T, F>(&self, key: &FetchKey, parse: F) -> Result<T>
    where
        F: Fn(&str) -> std::result::Result<T, String>,
    {
        if let Some(body) = self.cache.lookup(key) {
            match parse(&body) {
                Ok(parsed) => {
                    tracing::trace!("Cache hit for {}", key);
                    return Ok(parsed);
                }
                Err(reason) => tracing::debug!("Ignoring cached body for {}: {}", key, reason),
            }
        }

        let mut failures = 0u32;
        loop {
            let reason = match self.attempt(key).await {
                Attempt::Success(body) => match parse(&body) {
                    Ok(parsed) => {
                        self.cache.store(key, &body);
                        return Ok(parsed);
                    }
                    Err(reason) => format!("malformed body: {}", reason),
                },
                Attempt::RateLimited(delay) => {
                    tracing::debug!("Rate limited on {}, retrying in {:?}", key, delay);
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Attempt::Failed(reason) => reason,
            };

            failures += 1;
            if self.retry.is_exhausted(failures) {
                tracing::error!("Could not load page after {} tries: {}", failures, key);
                return Err(ScrapeError::FetchExhausted {
                    url: key.to_string(),
                    attempts: failures,
                });
            }
            tracing::warn!(
                "Request to {} failed ({}/{}): {}",
                key,
                failures,
                self.retry.max_failures,
                reason
            );
            tokio::time::sleep(self.retry.backoff).await;
        }
    }

    /// One network attempt, holding a permit until the body is read
    async fn attempt(&self, key: &FetchKey) -> Attempt {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => return Attempt::Failed(e.to_string()),
        };

        tracing::debug!("Fetching {}", key);
        let response = match self.client.get(key.url()).query(key.params()).send().await {
            Ok(response) => response,
            Err(e) => return Attempt::Failed(e.to_string()),
        };

        let status = response.status();
        if self.retry.is_rate_limited(status) {
            return Attempt::RateLimited(self.retry.retry_after(response.headers()));
        }
        if !status.is_success() {
            return Attempt::Failed(format!("HTTP {}", status));
        }

        match response.text().await {
            Ok(body) => Attempt::Success(body),
            Err(e) => Attempt::Failed(format!("failed to read body: {}", e)),
        }
    }
}
