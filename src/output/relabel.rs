//! Offline relabeling of existing catalogs

use crate::catalog::{
    apply_name_overrides, Item, ItemCategory, LanguageOverrides, Localized, Profession, Recipe,
};
use crate::output::{catalog_path, read_catalog, write_catalog};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Applies name overrides to every catalog present in `dir`
///
/// Missing catalogs are skipped. Record order is kept: overrides never touch
/// the English name the catalogs are sorted by. Returns the rewritten files.
pub fn relabel_catalogs(dir: &Path, overrides: &LanguageOverrides) -> Result<Vec<PathBuf>> {
    let mut rewritten = Vec::new();

    for profession in Profession::ALL {
        if let Some(path) = relabel::<Recipe>(dir, profession.name(), overrides)? {
            rewritten.push(path);
        }
    }
    for category in ItemCategory::ALL {
        if let Some(path) = relabel::<Item>(dir, category.name(), overrides)? {
            rewritten.push(path);
        }
    }

    Ok(rewritten)
}

fn relabel<T>(dir: &Path, name: &str, overrides: &LanguageOverrides) -> Result<Option<PathBuf>>
where
    T: Localized + Serialize + DeserializeOwned,
{
    let path = catalog_path(dir, name);
    if !path.exists() {
        tracing::debug!("No catalog at {}, skipping", path.display());
        return Ok(None);
    }

    let mut records: Vec<T> = read_catalog(&path)?;
    apply_name_overrides(&mut records, overrides);
    write_catalog(dir, name, &records).map(Some)
}
