//! Additional-language name overrides
//!
//! An override file is a JSON object mapping English display names to names in
//! another language. Files are given as `LANG=FILE` pairs and loaded once,
//! before any network activity.

use crate::catalog::Localized;
use crate::config::PRIMARY_LOCALE;
use crate::ConfigError;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// English name → override name, per locale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageOverrides {
    by_locale: BTreeMap<String, HashMap<String, String>>,
}

impl LanguageOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `LANG=FILE` spec
    pub fn load<S: AsRef<str>>(specs: &[S]) -> Result<Self, ConfigError> {
        let mut overrides = Self::new();
        for spec in specs {
            let (locale, path) = parse_spec(spec.as_ref())?;
            tracing::info!("Loading additional language '{}' from: {}", locale, path);
            overrides.insert(locale, load_mapping(Path::new(path))?);
        }
        Ok(overrides)
    }

    /// Adds or replaces the mapping for `locale`
    pub fn insert(&mut self, locale: impl Into<String>, names: HashMap<String, String>) {
        self.by_locale.insert(locale.into(), names);
    }

    pub fn is_empty(&self) -> bool {
        self.by_locale.is_empty()
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.by_locale.keys().map(String::as_str)
    }

    /// Applies every locale's mapping to one record
    ///
    /// A mapped English name replaces that locale's name. An unmapped one
    /// leaves a scraped name untouched, and falls back to the English name when
    /// the locale was never scraped.
    pub fn apply<T: Localized>(&self, entity: &mut T) {
        let english = entity.english_name().to_string();
        for (locale, names) in &self.by_locale {
            if locale == PRIMARY_LOCALE {
                continue;
            }
            let entity_names = entity.names_mut();
            match names.get(&english) {
                Some(name) => {
                    entity_names.insert(locale.clone(), name.clone());
                }
                None => {
                    entity_names
                        .entry(locale.clone())
                        .or_insert_with(|| english.clone());
                }
            }
        }
    }
}

/// Applies name overrides to every record in a collection
pub fn apply_name_overrides<T: Localized>(entities: &mut [T], overrides: &LanguageOverrides) {
    if overrides.is_empty() {
        return;
    }
    for entity in entities {
        overrides.apply(entity);
    }
}

fn parse_spec(spec: &str) -> Result<(&str, &str), ConfigError> {
    match spec.split_once('=') {
        Some((locale, path)) if !locale.trim().is_empty() && !path.trim().is_empty() => {
            Ok((locale.trim(), path.trim()))
        }
        _ => Err(ConfigError::LanguageSpec(spec.to_string())),
    }
}

fn load_mapping(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let file_error = |message: String| ConfigError::LanguageFile {
        path: path.display().to_string(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| file_error(e.to_string()))
}
