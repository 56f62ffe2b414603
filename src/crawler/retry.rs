//! Retry policy for the fetcher
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 429 | Wait `Retry-After` seconds (default 5), retry, budget untouched |
//! | Other non-2xx | Count a failure, wait the backoff, retry |
//! | Network / body error | Count a failure, wait the backoff, retry |
//! | Body rejected by the parser | Count a failure, wait the backoff, retry; never cached |
//! | Failures reach `max_failures` | Abort the run |

use crate::config::RetryConfig;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;

/// How the fetcher retries a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Failures tolerated before giving up; rate-limit responses are not failures
    pub max_failures: u32,

    /// Fixed wait after a failed attempt
    pub backoff: Duration,

    /// Wait after a rate-limit response with no usable `Retry-After`
    pub default_retry_after: Duration,

    /// Status retried at the server's pace without spending the budget
    pub rate_limit_status: StatusCode,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_failures: config.max_failures,
            backoff: config.backoff(),
            default_retry_after: config.default_retry_after(),
            rate_limit_status: StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// A policy with the given budget and equal backoff and rate-limit delays
    pub fn with_delays(max_failures: u32, delay: Duration) -> Self {
        Self {
            max_failures,
            backoff: delay,
            default_retry_after: delay,
            rate_limit_status: StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn is_rate_limited(&self, status: StatusCode) -> bool {
        status == self.rate_limit_status
    }

    /// Whether `failures` accumulated failures exhaust the budget
    pub fn is_exhausted(&self, failures: u32) -> bool {
        failures >= self.max_failures
    }

    /// Delay requested by a rate-limit response
    ///
    /// Only the delay-seconds form of `Retry-After` is understood; a missing or
    /// malformed header yields the default.
    pub fn retry_after(&self, headers: &HeaderMap) -> Duration {
        headers
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.default_retry_after)
    }
}
