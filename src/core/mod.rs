//! Core audit engine.
//!
//! The pipeline runs in three phases:
//!
//! 1. **Extract**: walk the source tree and collect normalized keys with
//!    their call sites (`extract`).
//! 2. **Load**: parse the catalog into normalized entries (`catalog`).
//! 3. **Reconcile**: diff the two key sets into an `AuditReport`
//!    (`reconcile`).

pub mod catalog;
pub mod error;
pub mod extract;
pub mod key;
pub mod locale;
pub mod reconcile;

pub use catalog::{
    Catalog, CatalogCodec, CatalogEntry, CatalogFormat, CatalogFormatKind, TranslationUnit,
    UnitState, load_catalog, save_catalog,
};
pub use error::AuditError;
pub use extract::{ExtractResult, ExtractorRegistry, SourceReference, extract_references};
pub use key::TranslationKey;
pub use locale::{is_valid_locale, validate_locale};
pub use reconcile::{AuditReport, MissingKey, ReconcileOptions, apply_fixes, reconcile};
