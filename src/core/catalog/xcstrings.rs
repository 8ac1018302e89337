//! Apple String Catalog (`.xcstrings`).
//!
//! ```json
//! {
//!   "sourceLanguage" : "en",
//!   "strings" : {
//!     "Hello %@" : {
//!       "localizations" : {
//!         "ru" : { "stringUnit" : { "state" : "translated", "value" : "Привет, %@" } }
//!       }
//!     }
//!   },
//!   "version" : "1.0"
//! }
//! ```

use std::{collections::BTreeMap, fmt, path::Path, sync::LazyLock};

use regex::Regex;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor},
};
use serde_json::{Map, Value, json};

use super::{
    Catalog, CatalogEntry, DocumentSlot, TranslationUnit, UnitState,
    format::{CatalogFormat, Layout, Members, json_type, parse_document, to_bytes},
    malformed,
};
use crate::core::{TranslationKey, error::Result};

const SOURCE_LANGUAGE: &str = "sourceLanguage";
const STRINGS: &str = "strings";
const VERSION: &str = "version";
const LOCALIZATIONS: &str = "localizations";
const STRING_UNIT: &str = "stringUnit";
const VARIATIONS: &str = "variations";
const SHOULD_TRANSLATE: &str = "shouldTranslate";

/// Positional placeholders of a normalized key.
static POSITIONAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\d+\}").expect("positional regex is valid"));

#[derive(Debug, Clone, Copy, Default)]
pub struct XcStrings;

impl CatalogFormat for XcStrings {
    fn parse(&self, path: &Path, bytes: &[u8]) -> Result<Catalog> {
        let Document(members) = parse_document(path, bytes)?;

        let source_locale = members
            .iter()
            .rev()
            .find_map(|(name, member)| match member {
                Member::Field(value) if name == SOURCE_LANGUAGE => Some(value),
                _ => None,
            });
        let source_locale = match source_locale {
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
        let mut document = Vec::with_capacity(members.len());
        for (name, member) in members {
            match member {
                Member::Field(value) => document.push(DocumentSlot::Field(name, value)),
                Member::Strings(strings) => {
                    for (raw_key, value) in strings.0 {
                        let entry = parse_entry(path, raw_key, value)?;
                        catalog.insert(entry);
                    }
                    if !document.contains(&DocumentSlot::Entries) {
                        document.push(DocumentSlot::Entries);
                    }
                }
            }
        }
        catalog.document = document;
        Ok(catalog)
    }

    fn serialize(&self, catalog: &Catalog, path: &Path) -> Result<Vec<u8>> {
        let strings = Members(
            catalog
                .all_entries()
                .iter()
                .map(|entry| {
                    let value = entry
                        .original
                        .clone()
                        .unwrap_or_else(|| synthesize_entry(entry));
                    (entry.raw_key.clone(), value)
                })
                .collect(),
        );

        let mut members = Vec::with_capacity(catalog.document.len() + 1);
        if catalog.document.is_empty() {
            if let Some(source) = &catalog.source_locale {
                members.push((SOURCE_LANGUAGE.to_string(), Member::Field(json!(source))));
            }
            members.push((STRINGS.to_string(), Member::Strings(strings)));
            members.push((VERSION.to_string(), Member::Field(json!("1.0"))));
        } else {
            let mut strings = Some(strings);
            for slot in &catalog.document {
                match slot {
                    DocumentSlot::Field(name, value) => {
                        members.push((name.clone(), Member::Field(value.clone())));
                    }
                    DocumentSlot::Entries | DocumentSlot::Entry(_) => {
                        if let Some(strings) = strings.take() {
                            members.push((STRINGS.to_string(), Member::Strings(strings)));
                        }
                    }
                }
            }
            if let Some(strings) = strings.filter(|s| !s.0.is_empty()) {
                members.push((STRINGS.to_string(), Member::Strings(strings)));
            }
        }

        to_bytes(&Members(members), Layout::Xcode).map_err(|e| malformed(path, e.to_string()))
    }

    /// Xcode keys spell interpolations as `%@`: `"Hello \(name)"` is stored
    /// as `"Hello %@"`.
    fn native_key(&self, key: &TranslationKey) -> String {
        let spelled = POSITIONAL_REGEX.replace_all(key.as_str(), "%@");
        if TranslationKey::normalize(&spelled) == *key {
            spelled.into_owned()
        } else {
            key.as_str().to_string()
        }
    }
}

/// Top-level members of a String Catalog in file order. Keys under
/// `strings` are read one by one so a repeated key is kept.
struct Document(Vec<(String, Member)>);

#[derive(Serialize)]
#[serde(untagged)]
enum Member {
    Strings(Members),
    Field(Value),
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = Document;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a String Catalog object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut members = Vec::new();
                while let Some(name) = map.next_key::<String>()? {
                    let member = if name == STRINGS {
                        Member::Strings(map.next_value()?)
                    } else {
                        Member::Field(map.next_value()?)
                    };
                    members.push((name, member));
                }
                Ok(Document(members))
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

fn parse_entry(path: &Path, raw_key: String, value: Value) -> Result<CatalogEntry> {
    let Value::Object(fields) = &value else {
        return Err(malformed(
            path,
            format!("entry \"{}\" must be an object, found {}", raw_key, json_type(&value)),
        ));
    };

    let should_translate = fields
        .get(SHOULD_TRANSLATE)
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let mut units = BTreeMap::new();
    match fields.get(LOCALIZATIONS) {
        None => {}
        Some(Value::Object(localizations)) => {
            for (locale, localization) in localizations {
                let unit = parse_localization(path, &raw_key, locale, localization)?;
                units.insert(locale.clone(), unit);
            }
        }
        Some(other) => {
            return Err(malformed(
                path,
                format!(
                    "\"{}\": '{}' must be an object, found {}",
                    raw_key,
                    LOCALIZATIONS,
                    json_type(other)
                ),
            ));
        }
    }

    Ok(CatalogEntry {
        key: TranslationKey::normalize(&raw_key),
        raw_key,
        units,
        should_translate,
        implicit_source: true,
        original: Some(value),
    })
}

/// Read a localization: a `stringUnit`, or `variations` summarised by the
/// weakest state among their leaves.
fn parse_localization(
    path: &Path,
    raw_key: &str,
    locale: &str,
    localization: &Value,
) -> Result<TranslationUnit> {
    let mut leaves = Vec::new();
    collect_string_units(path, raw_key, locale, localization, &mut leaves)?;

    let state = leaves
        .iter()
        .map(|(_, unit)| unit.state)
        .min()
        .unwrap_or(UnitState::Untranslated);
    let value = leaves
        .iter()
        .find(|(name, _)| name == "other")
        .or_else(|| leaves.first())
        .map(|(_, unit)| unit.value.clone())
        .unwrap_or_default();

    Ok(TranslationUnit::new(state, value))
}

fn collect_string_units(
    path: &Path,
    raw_key: &str,
    locale: &str,
    node: &Value,
    leaves: &mut Vec<(String, TranslationUnit)>,
) -> Result<()> {
    let Value::Object(fields) = node else {
        return Err(malformed(
            path,
            format!(
                "\"{}\" [{}]: localization must be an object, found {}",
                raw_key,
                locale,
                json_type(node)
            ),
        ));
    };

    if let Some(unit) = fields.get(STRING_UNIT) {
        leaves.push((String::new(), parse_string_unit(path, raw_key, locale, unit)?));
    }

    if let Some(Value::Object(variations)) = fields.get(VARIATIONS) {
        // { "plural": { "one": {...}, "other": {...} }, "device": {...} }
        for cases in variations.values() {
            let Value::Object(cases) = cases else {
                continue;
            };
            for (case, case_node) in cases {
                let start = leaves.len();
                collect_string_units(path, raw_key, locale, case_node, leaves)?;
                for leaf in &mut leaves[start..] {
                    if leaf.0.is_empty() {
                        leaf.0 = case.clone();
                    }
                }
            }
        }
    }

    Ok(())
}

fn parse_string_unit(
    path: &Path,
    raw_key: &str,
    locale: &str,
    unit: &Value,
) -> Result<TranslationUnit> {
    let state = match unit.get("state").and_then(Value::as_str) {
        Some("translated") => UnitState::Translated,
        Some("needs_review") => UnitState::NeedsReview,
        Some("new") => UnitState::Untranslated,
        Some("stale") => UnitState::Stale,
        Some(other) => {
            return Err(malformed(
                path,
                format!("\"{}\" [{}]: unknown state '{}'", raw_key, locale, other),
            ));
        }
        None => UnitState::Untranslated,
    };
    let value = unit
        .get("value")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Ok(TranslationUnit::new(state, value))
}

fn state_name(state: UnitState) -> &'static str {
    match state {
        UnitState::Untranslated => "new",
        UnitState::Translated => "translated",
        UnitState::NeedsReview => "needs_review",
        UnitState::Stale => "stale",
    }
}

fn synthesize_entry(entry: &CatalogEntry) -> Value {
    let mut fields = Map::new();
    if !entry.should_translate {
        fields.insert(SHOULD_TRANSLATE.to_string(), json!(false));
    }
    if !entry.units.is_empty() {
        let localizations: Map<String, Value> = entry
            .units
            .iter()
            .map(|(locale, unit)| {
                let mut string_unit = Map::new();
                string_unit.insert("state".to_string(), json!(state_name(unit.state)));
                string_unit.insert("value".to_string(), json!(unit.value));
                let mut localization = Map::new();
                localization.insert(STRING_UNIT.to_string(), Value::Object(string_unit));
                (locale.clone(), Value::Object(localization))
            })
            .collect();
        fields.insert(LOCALIZATIONS.to_string(), Value::Object(localizations));
    }
    Value::Object(fields)
}
