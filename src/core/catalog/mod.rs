//! Translation catalog: data model, loading and write-back.
//!
//! The catalog is the durable store. Entries are never removed here; stale
//! keys are only reported. Write-back re-emits every entry that was loaded
//! from its original JSON value, so a load/save cycle with no additions
//! reproduces the input byte for byte.

mod format;
mod keyed_json;
mod xcstrings;

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt, fs,
    io::Write,
    path::Path,
};

use serde::Serialize;
use serde_json::Value;

pub use format::{CatalogCodec, CatalogFormat, CatalogFormatKind};
pub use keyed_json::KeyedJson;
pub use xcstrings::XcStrings;

use crate::{
    core::{
        TranslationKey,
        error::{AuditError, Result},
    },
    issues::{AuditWarning, WarningKind},
};

/// Lifecycle state of a translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    Untranslated,
    Stale,
    NeedsReview,
    Translated,
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitState::Untranslated => write!(f, "untranslated"),
            UnitState::Stale => write!(f, "stale"),
            UnitState::NeedsReview => write!(f, "needs_review"),
            UnitState::Translated => write!(f, "translated"),
        }
    }
}

/// A (state, value) pair for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationUnit {
    pub state: UnitState,
    pub value: String,
}

impl TranslationUnit {
    pub fn new(state: UnitState, value: impl Into<String>) -> Self {
        Self {
            state,
            value: value.into(),
        }
    }

    pub fn is_translated(&self) -> bool {
        self.state == UnitState::Translated
    }
}

/// One record of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub key: TranslationKey,
    /// The key exactly as stored in the file.
    pub raw_key: String,
    pub units: BTreeMap<String, TranslationUnit>,
    /// False for entries marked as not needing translation.
    pub should_translate: bool,
    /// The key text doubles as the source-locale value (String Catalogs).
    pub implicit_source: bool,
    /// JSON the entry was loaded from; `None` for entries added in this run.
    pub(crate) original: Option<Value>,
}

impl CatalogEntry {
    /// A placeholder entry for a key found in code but absent from the catalog.
    /// `raw_key` is the format's spelling of `key` and doubles as the source
    /// text.
    pub fn new_untranslated(key: TranslationKey, raw_key: String, source_locale: &str) -> Self {
        let mut units = BTreeMap::new();
        units.insert(
            source_locale.to_string(),
            TranslationUnit::new(UnitState::Untranslated, raw_key.clone()),
        );
        Self {
            key,
            raw_key,
            units,
            should_translate: true,
            implicit_source: false,
            original: None,
        }
    }

    pub fn unit(&self, locale: &str) -> Option<&TranslationUnit> {
        self.units.get(locale)
    }

    /// Whether the entry provides text in the source locale.
    pub fn has_source(&self, source_locale: &str) -> bool {
        self.implicit_source || self.units.contains_key(source_locale)
    }

    pub fn is_translated(&self, locale: &str) -> bool {
        self.unit(locale).is_some_and(TranslationUnit::is_translated)
    }

    /// Text a translator would see: the source unit's value, else the key.
    pub fn source_text(&self, source_locale: &str) -> &str {
        match self.unit(source_locale) {
            Some(unit) if !unit.value.is_empty() => &unit.value,
            _ => &self.raw_key,
        }
    }
}

/// A top-level member of a loaded catalog file, in file order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DocumentSlot {
    /// A member that is not an entry, written back as loaded.
    Field(String, Value),
    /// The loaded entry at this index (keyed JSON).
    Entry(usize),
    /// The member holding every entry (`strings` in a String Catalog).
    Entries,
}

/// In-memory catalog keyed by normalized key, in file order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Source language declared by the file, if any.
    pub source_locale: Option<String>,
    entries: Vec<CatalogEntry>,
    index: HashMap<TranslationKey, usize>,
    /// Layout of the loaded file; empty for a catalog created in this run.
    pub(crate) document: Vec<DocumentSlot>,
    pub(crate) trailing_newline: bool,
    /// Non-fatal problems found while loading.
    pub warnings: Vec<AuditWarning>,
}

impl Catalog {
    pub fn new(source_locale: Option<String>) -> Self {
        Self {
            source_locale,
            trailing_newline: true,
            ..Default::default()
        }
    }

    /// Append an entry and return its index. A key colliding with an
    /// earlier one after normalization wins the lookup; both stay in the file.
    pub fn insert(&mut self, entry: CatalogEntry) -> usize {
        let position = self.entries.len();
        if let Some(previous) = self.index.insert(entry.key.clone(), position) {
            let previous = &self.entries[previous].raw_key;
            let message = if *previous == entry.raw_key {
                format!(
                    "catalog key \"{}\" appears more than once; using the last one",
                    entry.raw_key
                )
            } else {
                format!(
                    "catalog keys \"{}\" and \"{}\" both normalize to \"{}\"; using the latter",
                    previous, entry.raw_key, entry.key
                )
            };
            self.warnings
                .push(AuditWarning::new(WarningKind::DuplicateKey, None, message));
        }
        self.entries.push(entry);
        position
    }

    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Every entry in file order, including ones shadowed by a duplicate.
    pub fn all_entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries reachable by key, in file order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, e)| self.index.get(&e.key) == Some(i))
            .map(|(_, e)| e)
    }

    pub fn keys(&self) -> BTreeSet<&TranslationKey> {
        self.index.keys().collect()
    }

    /// Every locale that has at least one unit.
    pub fn locales(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .flat_map(|e| e.units.keys().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Check the translated-implies-non-empty invariant, downgrading
    /// offending units to untranslated.
    pub(crate) fn enforce_unit_invariants(&mut self) {
        for entry in &mut self.entries {
            for (locale, unit) in &mut entry.units {
                if unit.is_translated() && unit.value.is_empty() {
                    unit.state = UnitState::Untranslated;
                    self.warnings.push(AuditWarning::new(
                        WarningKind::EmptyTranslation,
                        None,
                        format!(
                            "\"{}\" is marked translated for '{}' but has no value; treated as untranslated",
                            entry.raw_key, locale
                        ),
                    ));
                }
            }
        }
    }
}

/// Read and parse a catalog file.
pub fn load_catalog(path: &Path, codec: &CatalogCodec) -> Result<Catalog> {
    let bytes = fs::read(path).map_err(|e| AuditError::file_system(path, e))?;
    let mut catalog = codec.parse(path, &bytes)?;
    catalog.trailing_newline = bytes.ends_with(b"\n");
    catalog.enforce_unit_invariants();
    Ok(catalog)
}

/// Serialize `catalog` and atomically replace `path` with it.
///
/// Serialization happens before any file is touched. The data goes to a
/// temporary file next to `path` that is renamed over it on success and
/// removed on every failure path.
pub fn save_catalog(catalog: &Catalog, path: &Path, codec: &CatalogCodec) -> Result<()> {
    let mut bytes = codec.serialize(catalog, path)?;
    if catalog.trailing_newline {
        bytes.push(b'\n');
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| AuditError::file_system(parent, e))?;

    let mut file = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| AuditError::file_system(parent, e))?;
    file.write_all(&bytes)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| AuditError::file_system(path, e))?;
    file.persist(path)
        .map_err(|e| AuditError::file_system(path, e.error))?;

    Ok(())
}

/// Build a catalog-format error for `path`.
pub(crate) fn malformed(path: &Path, message: impl Into<String>) -> AuditError {
    AuditError::catalog_format(path, message)
}
