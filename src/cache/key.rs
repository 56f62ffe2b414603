//! Request identity for cached responses

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a cacheable GET request: URL plus query parameters
///
/// Parameters are held sorted by name, so keys built from the same entries in
/// any insertion order compare equal and map to the same cache file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    url: String,
    params: BTreeMap<String, String>,
}

impl FetchKey {
    /// Creates a key for a URL without query parameters
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: BTreeMap::new(),
        }
    }

    /// Creates a key from a URL and any iterable of parameter pairs
    pub fn with_params<I, K, V>(url: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        Self {
            url: url.into(),
            params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        }
    }

    /// Adds or replaces a query parameter
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Hex-encoded SHA-256 over the URL and the sorted `name=value;` pairs
    ///
    /// Used as the cache file name.
    pub fn cache_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url.as_bytes());
        for (name, value) in &self.params {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b";");
        }
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)?;
        let mut sep = '?';
        for (name, value) in &self.params {
            write!(f, "{}{}={}", sep, name, value)?;
            sep = '&';
        }
        Ok(())
    }
}
