//! JSON catalog files

use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Path of the catalog file named `name` (e.g. `out/Weaver.json`)
pub fn catalog_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", name))
}

/// Serializes records as a pretty-printed JSON array with sorted object keys
pub fn to_sorted_json<T: Serialize>(records: &[T]) -> Result<String> {
    let value = sort_keys(serde_json::to_value(records)?);
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Writes a catalog, replacing any previous file atomically
///
/// The file is written next to its destination and renamed into place, so an
/// interrupted run never leaves a truncated catalog behind.
pub fn write_catalog<T: Serialize>(dir: &Path, name: &str, records: &[T]) -> Result<PathBuf> {
    let json = to_sorted_json(records)?;
    fs::create_dir_all(dir)?;

    let path = catalog_path(dir, name);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.flush()?;
    tmp.persist(&path).map_err(|e| e.error)?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(path)
}

pub fn read_catalog<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Rebuilds every object with its keys in ascending order
///
/// Without serde_json's `preserve_order` feature `Map` is already sorted and
/// this is a plain copy. With it (enabled by any crate in the build graph),
/// maps keep insertion order and this pass restores sorted keys.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(values) => Value::Array(values.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
