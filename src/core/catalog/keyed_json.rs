//! Keyed locale map in plain JSON.
//!
//! ```json
//! {
//!   "@sourceLanguage": "en",
//!   "Save": { "en": "Save", "ru": "Сохранить", "de": null },
//!   "Welcome, {0}!": { "en": { "state": "needs_review", "value": "Welcome, {0}!" } }
//! }
//! ```
//!
//! A non-empty string is translated, `""` and `null` are untranslated, and
//! the object form carries an explicit state. `@sourceLanguage` is the only
//! member that is not an entry; other keys, `@mention` included, are entries.
//! Members are written back in file order, new entries last.

use std::{collections::BTreeMap, path::Path};

use serde_json::{Map, Value, json};

use super::{
    Catalog, CatalogEntry, DocumentSlot, TranslationUnit, UnitState,
    format::{CatalogFormat, Layout, Members, json_type, parse_document, to_bytes},
    malformed,
};
use crate::core::{TranslationKey, error::Result};

const SOURCE_LANGUAGE: &str = "@sourceLanguage";

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyedJson;

impl CatalogFormat for KeyedJson {
    fn parse(&self, path: &Path, bytes: &[u8]) -> Result<Catalog> {
        let root: Members = parse_document(path, bytes)?;

        let source_locale = match root.last(SOURCE_LANGUAGE) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(malformed(
                    path,
                    format!("'{}' must be a string, found {}", SOURCE_LANGUAGE, json_type(other)),
                ));
            }
        };

        let mut catalog = Catalog::new(source_locale);
        let mut document = Vec::with_capacity(root.0.len());
        for (raw_key, value) in root.0 {
            if raw_key == SOURCE_LANGUAGE {
                document.push(DocumentSlot::Field(raw_key, value));
                continue;
            }
            let entry = parse_entry(path, raw_key, value)?;
            document.push(DocumentSlot::Entry(catalog.insert(entry)));
        }
        catalog.document = document;
        Ok(catalog)
    }

    fn serialize(&self, catalog: &Catalog, path: &Path) -> Result<Vec<u8>> {
        let entries = catalog.all_entries();
        let mut written = vec![false; entries.len()];
        let mut members = Vec::with_capacity(catalog.document.len() + 1);

        if catalog.document.is_empty()
            && let Some(source) = &catalog.source_locale
        {
            members.push((SOURCE_LANGUAGE.to_string(), json!(source)));
        }
        for slot in &catalog.document {
            match slot {
                DocumentSlot::Field(name, value) => members.push((name.clone(), value.clone())),
                DocumentSlot::Entry(index) => {
                    if let Some(entry) = entries.get(*index) {
                        members.push(entry_member(entry));
                        written[*index] = true;
                    }
                }
                DocumentSlot::Entries => {}
            }
        }
        for (entry, _) in entries.iter().zip(&written).filter(|(_, done)| !**done) {
            members.push(entry_member(entry));
        }

        to_bytes(&Members(members), Layout::Pretty).map_err(|e| malformed(path, e.to_string()))
    }
}

fn entry_member(entry: &CatalogEntry) -> (String, Value) {
    let value = entry
        .original
        .clone()
        .unwrap_or_else(|| synthesize_entry(entry));
    (entry.raw_key.clone(), value)
}

fn parse_entry(path: &Path, raw_key: String, value: Value) -> Result<CatalogEntry> {
    let Value::Object(locales) = &value else {
        return Err(malformed(
            path,
            format!("entry \"{}\" must be an object, found {}", raw_key, json_type(&value)),
        ));
    };

    let mut units = BTreeMap::new();
    for (locale, unit) in locales {
        let unit = match unit {
            Value::Null => TranslationUnit::new(UnitState::Untranslated, ""),
            Value::String(s) if s.is_empty() => TranslationUnit::new(UnitState::Untranslated, ""),
            Value::String(s) => TranslationUnit::new(UnitState::Translated, s.clone()),
            Value::Object(fields) => parse_unit_object(path, &raw_key, locale, fields)?,
            other => {
                return Err(malformed(
                    path,
                    format!(
                        "\"{}\" [{}]: expected a string, null or object, found {}",
                        raw_key,
                        locale,
                        json_type(other)
                    ),
                ));
            }
        };
        units.insert(locale.clone(), unit);
    }

    Ok(CatalogEntry {
        key: TranslationKey::normalize(&raw_key),
        raw_key,
        units,
        should_translate: true,
        implicit_source: false,
        original: Some(value),
    })
}

fn parse_unit_object(
    path: &Path,
    raw_key: &str,
    locale: &str,
    fields: &Map<String, Value>,
) -> Result<TranslationUnit> {
    let state = match fields.get("state").and_then(Value::as_str) {
        Some("untranslated") => UnitState::Untranslated,
        Some("translated") => UnitState::Translated,
        Some("needs_review") => UnitState::NeedsReview,
        Some("stale") => UnitState::Stale,
        Some(other) => {
            return Err(malformed(
                path,
                format!("\"{}\" [{}]: unknown state '{}'", raw_key, locale, other),
            ));
        }
        None => {
            return Err(malformed(
                path,
                format!("\"{}\" [{}]: missing 'state'", raw_key, locale),
            ));
        }
    };
    let value = match fields.get("value") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(malformed(
                path,
                format!(
                    "\"{}\" [{}]: 'value' must be a string, found {}",
                    raw_key,
                    locale,
                    json_type(other)
                ),
            ));
        }
    };
    Ok(TranslationUnit::new(state, value))
}

fn synthesize_entry(entry: &CatalogEntry) -> Value {
    let locales: Map<String, Value> = entry
        .units
        .iter()
        .map(|(locale, unit)| {
            let value = match unit.state {
                UnitState::Translated if !unit.value.is_empty() => json!(unit.value),
                UnitState::Untranslated if unit.value.is_empty() => Value::Null,
                _ => json!({ "state": unit.state.to_string(), "value": unit.value }),
            };
            (locale.clone(), value)
        })
        .collect();
    Value::Object(locales)
}
