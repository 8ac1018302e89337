//! Common utility functions shared across the codebase.

use std::path::Path;

/// Build an index of line start byte offsets for O(log n) line lookups.
///
/// Line 1 starts at offset 0, line 2 starts after the first '\n', etc.
pub fn build_line_index(content: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, b) in content.bytes().enumerate() {
        if b == b'\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

/// Find the 1-based line number for a byte offset using binary search.
pub fn offset_to_line(line_index: &[usize], offset: usize) -> usize {
    match line_index.binary_search(&offset) {
        Ok(line) => line + 1,
        Err(line) => line,
    }
}

/// Render `path` relative to `root` with forward slashes.
///
/// Falls back to the full path when `path` is not under `root`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use locaudit::utils::display_relative;
///
/// assert_eq!(display_relative(Path::new("/p/src/App.swift"), Path::new("/p")), "src/App.swift");
/// assert_eq!(display_relative(Path::new("/other/a.js"), Path::new("/p")), "/other/a.js");
/// ```
pub fn display_relative(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .replace("//", "/")
}
