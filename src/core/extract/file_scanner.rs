use std::{
    fs, io,
    path::{Path, PathBuf},
};

use glob::Pattern;
use walkdir::WalkDir;

use super::registry::ExtractorRegistry;
use crate::{
    core::error::{AuditError, Result},
    issues::{AuditWarning, WarningKind},
    utils::display_relative,
};

/// Result of scanning files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Files with a registered extension, sorted by path.
    pub files: Vec<PathBuf>,
    pub warnings: Vec<AuditWarning>,
}

/// Recursively enumerate the files under `root` that some extractor handles.
///
/// An unreadable root is fatal. Anything that fails below the root becomes a
/// warning and is skipped.
pub fn scan_files(
    root: &Path,
    registry: &ExtractorRegistry,
    ignore_patterns: &[String],
) -> Result<ScanResult> {
    let metadata = fs::metadata(root).map_err(|e| AuditError::file_system(root, e))?;
    if !metadata.is_dir() {
        return Err(AuditError::file_system(
            root,
            io::Error::other("not a directory"),
        ));
    }
    fs::read_dir(root).map_err(|e| AuditError::file_system(root, e))?;

    // Config validation rejects bad globs; anything left over is ignored.
    let patterns: Vec<Pattern> = ignore_patterns
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();

    let mut result = ScanResult::default();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| display_relative(p, root))
                    .filter(|p| !p.is_empty());
                result.warnings.push(AuditWarning::new(
                    WarningKind::WalkError,
                    path,
                    format!("cannot access path: {}", e),
                ));
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || !registry.is_scannable(path) {
            continue;
        }

        let relative = display_relative(path, root);
        let absolute = path.to_string_lossy();
        if patterns
            .iter()
            .any(|p| p.matches(&relative) || p.matches(&absolute))
        {
            continue;
        }

        result.files.push(path.to_path_buf());
    }

    result.files.sort();
    Ok(result)
}
