//! Reconciliation of code-referenced keys against the catalog.
//!
//! A pure function of its inputs: the extracted key set, the catalog and the
//! target locales. The only mutation is `apply_fixes`, which callers invoke
//! explicitly.

use std::collections::{BTreeMap, BTreeSet};

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use super::{
    TranslationKey,
    catalog::{Catalog, CatalogEntry, CatalogFormat},
    error::Result,
    extract::SourceReference,
    locale::validate_locale,
};
use crate::{
    config::Glossary,
    issues::{Advisory, AdvisoryKind, AuditWarning, Category},
};

/// What to reconcile against.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub source_locale: String,
    /// Locales whose completeness is checked. Empty means every locale
    /// present in the catalog other than the source locale.
    pub target_locales: Vec<String>,
    pub glossary: Glossary,
}

/// A key referenced in code but absent from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingKey {
    pub key: TranslationKey,
    pub references: Vec<SourceReference>,
}

/// Outcome of one audit run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub source_locale: String,
    pub locales: Vec<String>,
    pub missing_from_catalog: Vec<MissingKey>,
    pub missing_translation: BTreeMap<String, Vec<TranslationKey>>,
    pub stale: Vec<TranslationKey>,
    pub advisories: Vec<Advisory>,
    pub warnings: Vec<AuditWarning>,
    pub files_scanned: usize,
    pub catalog_entries: usize,
}

impl AuditReport {
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::MissingFromCatalog => self.missing_from_catalog.len(),
            Category::MissingTranslation => self.missing_translation.values().map(Vec::len).sum(),
            Category::Stale => self.stale.len(),
        }
    }

    pub fn is_clean(&self) -> bool {
        Category::all().iter().all(|c| self.count(*c) == 0)
    }

    /// Bit set of the non-empty categories.
    pub fn exit_bits(&self) -> u8 {
        Category::all()
            .iter()
            .filter(|c| self.count(**c) > 0)
            .fold(0, |bits, c| bits | c.exit_bit())
    }
}

/// Compare code keys with catalog keys.
///
/// Fails with `InvalidLocale` before doing any work if the source locale or
/// a target locale is not a well-formed BCP-47 tag.
pub fn reconcile(
    code_keys: &BTreeMap<TranslationKey, Vec<&SourceReference>>,
    catalog: &Catalog,
    options: &ReconcileOptions,
) -> Result<AuditReport> {
    validate_locale(&options.source_locale)?;
    for locale in &options.target_locales {
        validate_locale(locale)?;
    }

    let source = options.source_locale.as_str();
    let locales = target_locales(catalog, options);
    let catalog_keys = catalog.keys();

    let missing_from_catalog = code_keys
        .iter()
        .filter(|(key, _)| !catalog.contains(key.as_str()))
        .map(|(key, refs)| MissingKey {
            key: key.clone(),
            references: refs.iter().map(|r| (*r).clone()).collect(),
        })
        .collect();

    let stale = catalog_keys
        .iter()
        .filter(|key| !code_keys.contains_key(**key))
        .map(|key| (*key).clone())
        .collect();

    let mut missing_translation = BTreeMap::new();
    for locale in &locales {
        let mut keys: Vec<TranslationKey> = catalog
            .entries()
            .filter(|entry| entry.should_translate && entry.has_source(source))
            .filter(|entry| !entry.is_translated(locale))
            .map(|entry| entry.key.clone())
            .collect();
        keys.sort();
        missing_translation.insert(locale.clone(), keys);
    }

    let mut advisories = inconsistent_translations(catalog, source, &locales);
    advisories.extend(glossary_violations(catalog, source, &locales, &options.glossary));
    advisories.sort();

    Ok(AuditReport {
        source_locale: source.to_string(),
        locales,
        missing_from_catalog,
        missing_translation,
        stale,
        advisories,
        warnings: Vec::new(),
        files_scanned: 0,
        catalog_entries: catalog.len(),
    })
}

/// Add an untranslated entry for every key in `missing_from_catalog`,
/// spelled the way `format` stores keys. Existing entries are never touched.
/// Returns the number of entries added.
pub fn apply_fixes<F: CatalogFormat>(
    catalog: &mut Catalog,
    report: &AuditReport,
    format: &F,
) -> usize {
    let mut added = 0;
    for missing in &report.missing_from_catalog {
        if catalog.contains(missing.key.as_str()) {
            continue;
        }
        catalog.insert(CatalogEntry::new_untranslated(
            missing.key.clone(),
            format.native_key(&missing.key),
            &report.source_locale,
        ));
        added += 1;
    }
    added
}

fn target_locales(catalog: &Catalog, options: &ReconcileOptions) -> Vec<String> {
    let locales: BTreeSet<String> = if options.target_locales.is_empty() {
        catalog.locales().into_iter().map(str::to_string).collect()
    } else {
        options.target_locales.iter().cloned().collect()
    };
    locales
        .into_iter()
        .filter(|l| *l != options.source_locale)
        .collect()
}

/// Entries sharing a source text (case-insensitively) but translated
/// differently in the same locale.
fn inconsistent_translations(catalog: &Catalog, source: &str, locales: &[String]) -> Vec<Advisory> {
    let mut advisories = Vec::new();
    for locale in locales {
        let mut groups: BTreeMap<String, Vec<&CatalogEntry>> = BTreeMap::new();
        for entry in catalog.entries() {
            if entry.should_translate && entry.is_translated(locale) {
                groups
                    .entry(entry.source_text(source).to_lowercase())
                    .or_default()
                    .push(entry);
            }
        }

        for entries in groups.values() {
            let renderings: BTreeSet<&str> = entries
                .iter()
                .filter_map(|e| e.unit(locale))
                .map(|u| u.value.as_str())
                .collect();
            if renderings.len() < 2 {
                continue;
            }
            let Some(first) = entries.iter().map(|e| &e.key).min() else {
                continue;
            };
            advisories.push(Advisory {
                kind: AdvisoryKind::InconsistentTranslation,
                locale: locale.clone(),
                key: first.clone(),
                message: format!(
                    "\"{}\" has {} different translations across {} entries: {}",
                    entries[0].source_text(source),
                    renderings.len(),
                    entries.len(),
                    renderings
                        .iter()
                        .map(|r| format!("\"{}\"", r))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            });
        }
    }
    advisories
}

/// Translated values whose source text uses a glossary term without the
/// term's required rendering.
fn glossary_violations(
    catalog: &Catalog,
    source: &str,
    locales: &[String],
    glossary: &Glossary,
) -> Vec<Advisory> {
    let mut advisories = Vec::new();
    for (term, renderings) in glossary {
        let Some(matcher) = term_matcher(term) else {
            continue;
        };
        for (locale, rendering) in renderings {
            if !locales.contains(locale) {
                continue;
            }
            let required = rendering.to_lowercase();
            for entry in catalog.entries() {
                let Some(unit) = entry.unit(locale).filter(|u| u.is_translated()) else {
                    continue;
                };
                if !matcher.is_match(entry.source_text(source)) {
                    continue;
                }
                if unit.value.to_lowercase().contains(&required) {
                    continue;
                }
                advisories.push(Advisory {
                    kind: AdvisoryKind::Glossary,
                    locale: locale.clone(),
                    key: entry.key.clone(),
                    message: format!(
                        "glossary term \"{}\" should be rendered as \"{}\", found \"{}\"",
                        term, rendering, unit.value
                    ),
                });
            }
        }
    }
    advisories
}

fn term_matcher(term: &str) -> Option<Regex> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(term)))
        .case_insensitive(true)
        .build()
        .ok()
}
