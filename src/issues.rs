//! Findings produced by an audit run.
//!
//! Three kinds of output accompany an `AuditReport`:
//! - `Category`: the three reconciliation buckets, each mapped to an exit bit
//! - `AuditWarning`: non-fatal conditions hit while reading inputs
//! - `Advisory`: translation consistency hints that never fail a run

use std::fmt;

use serde::Serialize;

use crate::core::TranslationKey;

// ============================================================
// Categories
// ============================================================

/// Reconciliation category of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    MissingFromCatalog,
    MissingTranslation,
    Stale,
}

impl Category {
    pub fn all() -> [Category; 3] {
        [
            Category::MissingFromCatalog,
            Category::MissingTranslation,
            Category::Stale,
        ]
    }

    /// Bit contributed to the process exit code when the category is non-empty.
    pub fn exit_bit(self) -> u8 {
        match self {
            Category::MissingFromCatalog => 1,
            Category::MissingTranslation => 2,
            Category::Stale => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::MissingFromCatalog => write!(f, "missing-from-catalog"),
            Category::MissingTranslation => write!(f, "missing-translation"),
            Category::Stale => write!(f, "stale"),
        }
    }
}

// ============================================================
// Warnings
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// A file could not be opened or read.
    UnreadableFile,
    /// A file is not valid UTF-8 (binary or foreign encoding).
    UndecodableFile,
    /// The directory walk failed below the root.
    WalkError,
    /// An extraction pattern matched in zero files.
    Pattern,
    /// Two catalog keys normalize to the same translation key.
    DuplicateKey,
    /// A unit marked translated carries an empty value.
    EmptyTranslation,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::UnreadableFile => write!(f, "unreadable-file"),
            WarningKind::UndecodableFile => write!(f, "undecodable-file"),
            WarningKind::WalkError => write!(f, "walk-error"),
            WarningKind::Pattern => write!(f, "pattern"),
            WarningKind::DuplicateKey => write!(f, "duplicate-key"),
            WarningKind::EmptyTranslation => write!(f, "empty-translation"),
        }
    }
}

/// A non-fatal condition surfaced alongside the report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AuditWarning {
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

impl AuditWarning {
    pub fn new(kind: WarningKind, path: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    /// Per-file warnings are summarised unless running verbose.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self.kind,
            WarningKind::UnreadableFile | WarningKind::UndecodableFile | WarningKind::WalkError
        )
    }
}

impl fmt::Display for AuditWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

// ============================================================
// Advisories
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvisoryKind {
    /// Same source text translated differently across entries.
    InconsistentTranslation,
    /// A glossary term is not rendered with its required translation.
    Glossary,
}

impl fmt::Display for AdvisoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryKind::InconsistentTranslation => write!(f, "inconsistent-translation"),
            AdvisoryKind::Glossary => write!(f, "glossary"),
        }
    }
}

/// A translation consistency hint. Context-dependent variation is legitimate,
/// so advisories never contribute to the exit code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub locale: String,
    pub key: TranslationKey,
    pub message: String,
}
