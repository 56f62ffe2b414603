//! Output module for catalog files
//!
//! This module handles:
//! - Writing catalogs as pretty-printed JSON with sorted keys
//! - Reading catalogs back
//! - Re-applying language overrides to catalogs already on disk

mod json;
mod relabel;

pub use json::{catalog_path, read_catalog, to_sorted_json, write_catalog};
pub use relabel::relabel_catalogs;
