//! Disk-backed response cache
//!
//! One JSON file per entry, named by the key's content hash. Writes go to a
//! temporary file in the same directory and are renamed into place, so a
//! concurrent reader sees either the old entry, the new one, or nothing.

use crate::cache::{CachedResponse, FetchKey, ResponseCache};
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Response cache stored under a single directory
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    expiry: Duration,
}

impl DiskCache {
    /// Creates a cache rooted at `dir`; the directory is created on first store
    pub fn new(dir: impl Into<PathBuf>, expiry: Duration) -> Self {
        Self {
            dir: dir.into(),
            expiry,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`'s entry
    pub fn entry_path(&self, key: &FetchKey) -> PathBuf {
        self.dir.join(key.cache_id())
    }

    /// Looks up `key` as seen at `now`
    ///
    /// Expired entries are deleted. Missing, unreadable and corrupt entries
    /// are reported as absent.
    pub fn lookup_at(&self, key: &FetchKey, now: DateTime<Utc>) -> Option<String> {
        let path = self.entry_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::debug!("Unreadable cache entry {}: {}", path.display(), e);
                }
                return None;
            }
        };

        let entry: CachedResponse = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Corrupt cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        if entry.is_expired_at(now, self.expiry) {
            tracing::debug!("Cache entry for {} expired, removing", key);
            if let Err(e) = fs::remove_file(&path) {
                tracing::debug!("Failed to remove {}: {}", path.display(), e);
            }
            return None;
        }

        Some(entry.body)
    }

    /// Stores an already-built entry, replacing any previous one atomically
    pub fn store_entry(&self, key: &FetchKey, entry: &CachedResponse) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string(entry).map_err(io::Error::other)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(self.entry_path(key)).map_err(|e| e.error)?;
        Ok(())
    }

    /// Removes the whole cache directory
    ///
    /// A directory that does not exist is already clear.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {
                tracing::info!("Cleared cache directory {}", self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl ResponseCache for DiskCache {
    fn lookup(&self, key: &FetchKey) -> Option<String> {
        self.lookup_at(key, Utc::now())
    }

    fn store(&self, key: &FetchKey, body: &str) {
        if let Err(e) = self.store_entry(key, &CachedResponse::new(body)) {
            tracing::warn!("Failed to cache response for {}: {}", key, e);
        }
    }
}
