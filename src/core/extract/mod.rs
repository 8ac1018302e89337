//! Key extraction: walk the source tree and find localization call sites.
//!
//! Each run re-walks the directory; nothing is cached between runs, so two
//! runs over an unchanged tree produce identical references.

mod file_scanner;
mod registry;

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::Path,
};

use rayon::prelude::*;
use serde::Serialize;

pub use file_scanner::{ScanResult, scan_files};
pub use registry::{
    CustomExtractor, Extractor, ExtractorConfig, ExtractorRegistry, Preset, RawMatch,
};

use crate::{
    core::{TranslationKey, error::Result},
    issues::{AuditWarning, WarningKind},
    utils::{build_line_index, display_relative, offset_to_line},
};

/// Where a key was found. Recomputed on every run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SourceReference {
    /// Path relative to the scanned root.
    pub file: String,
    /// 1-based line of the match start.
    pub line: usize,
    pub key: TranslationKey,
    /// Captured text exactly as written in the file.
    pub raw: String,
}

/// Output of one extraction run.
#[derive(Debug, Default)]
pub struct ExtractResult {
    /// Sorted by (file, line, key), deduplicated on that triple.
    pub references: Vec<SourceReference>,
    pub files_scanned: usize,
    pub warnings: Vec<AuditWarning>,
}

impl ExtractResult {
    /// Distinct keys with every reference that produced them.
    pub fn keys(&self) -> BTreeMap<TranslationKey, Vec<&SourceReference>> {
        let mut keys: BTreeMap<TranslationKey, Vec<&SourceReference>> = BTreeMap::new();
        for reference in &self.references {
            keys.entry(reference.key.clone())
                .or_default()
                .push(reference);
        }
        keys
    }
}

/// What a single file contributed.
#[derive(Debug, Default)]
struct FileExtraction {
    references: Vec<SourceReference>,
    /// (extractor, pattern) pairs that matched at least once.
    pattern_hits: HashSet<(usize, usize)>,
    /// Extractors that applied to the file.
    extractors: Vec<usize>,
    warning: Option<AuditWarning>,
}

/// Extract every source reference under `root`.
///
/// Files are read in parallel; the result is re-sorted so ordering does not
/// depend on traversal or scheduling.
pub fn extract_references(
    root: &Path,
    registry: &ExtractorRegistry,
    ignore_patterns: &[String],
) -> Result<ExtractResult> {
    let scan = scan_files(root, registry, ignore_patterns)?;

    let extractions: Vec<FileExtraction> = scan
        .files
        .par_iter()
        .map(|path| extract_file(path, root, registry))
        .collect();

    let extractor_count = registry.extractors().len();
    let mut files_per_extractor = vec![0usize; extractor_count];
    let mut hits: HashSet<(usize, usize)> = HashSet::new();

    let mut result = ExtractResult {
        files_scanned: scan.files.len(),
        warnings: scan.warnings,
        ..Default::default()
    };

    for extraction in extractions {
        for index in &extraction.extractors {
            files_per_extractor[*index] += 1;
        }
        hits.extend(extraction.pattern_hits);
        result.references.extend(extraction.references);
        result.warnings.extend(extraction.warning);
    }

    result.references.sort();
    result
        .references
        .dedup_by(|a, b| a.file == b.file && a.line == b.line && a.key == b.key);

    result.warnings.extend(pattern_warnings(
        registry,
        &files_per_extractor,
        &hits,
    ));

    Ok(result)
}

fn extract_file(path: &Path, root: &Path, registry: &ExtractorRegistry) -> FileExtraction {
    let relative = display_relative(path, root);
    let extractors = registry.for_path(path).to_vec();
    let mut extraction = FileExtraction {
        extractors,
        ..Default::default()
    };

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            extraction.warning = Some(AuditWarning::new(
                WarningKind::UnreadableFile,
                Some(relative),
                format!("skipped: {}", e),
            ));
            return extraction;
        }
    };
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(_) => {
            extraction.warning = Some(AuditWarning::new(
                WarningKind::UndecodableFile,
                Some(relative),
                "skipped: not valid UTF-8",
            ));
            return extraction;
        }
    };

    let line_index = build_line_index(&content);
    for &extractor_index in &extraction.extractors {
        let extractor = &registry.extractors()[extractor_index];
        for raw_match in extractor.find_matches(&content) {
            extraction
                .pattern_hits
                .insert((extractor_index, raw_match.pattern_index));
            let key = TranslationKey::normalize(&unescape_literal(&raw_match.text));
            extraction.references.push(SourceReference {
                file: relative.clone(),
                line: offset_to_line(&line_index, raw_match.offset),
                key,
                raw: raw_match.text,
            });
        }
    }

    extraction
}

fn pattern_warnings(
    registry: &ExtractorRegistry,
    files_per_extractor: &[usize],
    hits: &HashSet<(usize, usize)>,
) -> Vec<AuditWarning> {
    let mut warnings = Vec::new();
    for (extractor_index, extractor) in registry.extractors().iter().enumerate() {
        let files = files_per_extractor[extractor_index];
        if files == 0 && !extractor.explicit {
            continue;
        }
        for (pattern_index, pattern) in extractor.patterns.iter().enumerate() {
            if hits.contains(&(extractor_index, pattern_index)) {
                continue;
            }
            warnings.push(AuditWarning::new(
                WarningKind::Pattern,
                None,
                format!(
                    "extractor '{}' pattern #{} matched no files ({} file(s) with extensions {}): {}",
                    extractor.name,
                    pattern_index + 1,
                    files,
                    extractor.extensions.join(", "),
                    pattern.as_str()
                ),
            ));
        }
    }
    warnings
}

/// Decode string literal escapes. Swift interpolation `\(` is kept as-is so
/// normalization can still see it.
pub fn unescape_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('`') => out.push('`'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
