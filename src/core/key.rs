//! Translation key normalization.
//!
//! Source code and catalogs spell interpolation differently: SwiftUI writes
//! `"Hi \(name)"`, Xcode stores it as `"Hi %@"`, web frameworks use
//! `"Hi {name}"` or `"Hi {{name}}"`. All of them collapse to the positional
//! form `"Hi {0}"`, so equivalent strings join regardless of syntax.

use std::{borrow::Borrow, fmt, sync::LazyLock};

use regex::{Captures, Regex};
use serde::Serialize;

/// Any placeholder syntax, plus the `%%` literal which must survive untouched.
static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<percent>%%)",
        r"|\\\((?:[^()]|\([^()]*\))*\)",
        r"|\{\{[^{}]+\}\}",
        r"|\{\s*[A-Za-z0-9_][A-Za-z0-9_.\-]*\s*\}",
        r"|%(?:\d+\$)?[-+#0]*(?:\d+|\*)?(?:\.(?:\d+|\*))?(?:hh|h|ll|l|q|L|z|j|t)?[@dDiuUxXoOfFeEgGcCsSpaA]",
    ))
    .expect("placeholder regex is valid")
});

/// A normalized key used to join source references against catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TranslationKey(String);

impl TranslationKey {
    /// Normalize raw text into a key.
    pub fn normalize(raw: &str) -> Self {
        TranslationKey(normalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of placeholders in the key.
    pub fn placeholder_count(&self) -> usize {
        PLACEHOLDER_REGEX
            .captures_iter(&self.0)
            .filter(|caps| caps.name("percent").is_none())
            .count()
    }
}

impl fmt::Display for TranslationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TranslationKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TranslationKey {
    fn from(raw: &str) -> Self {
        TranslationKey::normalize(raw)
    }
}

/// Collapse every placeholder in `raw` to `{N}`, numbered by position.
///
/// Deterministic and idempotent: `normalize(&normalize(s)) == normalize(s)`.
/// A replacement can form a new placeholder with the text around it
/// (`{{{x}}}` becomes `{{0}}`), so passes repeat until nothing changes.
/// Every pass after the first that changes the string consumes characters
/// outside existing `{N}` tokens, which bounds the loop.
pub fn normalize(raw: &str) -> String {
    let mut current = normalize_pass(raw);
    loop {
        let next = normalize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_pass(raw: &str) -> String {
    let mut index = 0usize;
    PLACEHOLDER_REGEX
        .replace_all(raw, |caps: &Captures| {
            if caps.name("percent").is_some() {
                return "%%".to_string();
            }
            let placeholder = format!("{{{}}}", index);
            index += 1;
            placeholder
        })
        .into_owned()
}
