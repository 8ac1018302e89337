use std::{collections::HashMap, path::Path};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::error::{AuditError, Result};

/// Built-in extraction rules for common localization APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// SwiftUI views, `String(localized:)`, `NSLocalizedString`.
    Swift,
    /// `t("..")`, `i18n.t("..")`, `$t("..")` in web sources.
    Javascript,
    /// `R.string.name` and `@string/name` references.
    Android,
}

const SWIFT_PATTERN: &str = concat!(
    r#"(?:\b(?:Text|Button|Label|Toggle|Picker|Section|Link|NavigationLink|Menu|TextField"#,
    r#"|LocalizedStringKey|LocalizedStringResource|NSLocalizedString|navigationTitle|help"#,
    r#"|alert|confirmationDialog)\(\s*|\bString\(\s*localized:\s*)"((?:[^"\\\n]|\\.)*)""#,
);

const JAVASCRIPT_PATTERN: &str = concat!(
    r#"(?:\bi18n\.t|\$t|\bt)\(\s*(?:"((?:[^"\\\n]|\\.)*)"|'((?:[^'\\\n]|\\.)*)'"#,
    r#"|`((?:[^`\\$]|\\.|\$[^{`])*)`)"#,
);

const ANDROID_PATTERN: &str = r"\bR\.string\.([A-Za-z0-9_]+)|@string/([A-Za-z0-9_]+)";

impl Preset {
    pub fn all() -> Vec<Preset> {
        vec![Preset::Swift, Preset::Javascript, Preset::Android]
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Swift => "swift",
            Preset::Javascript => "javascript",
            Preset::Android => "android",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Preset::Swift => &["swift"],
            Preset::Javascript => &["js", "jsx", "ts", "tsx", "mjs", "cjs", "vue", "svelte"],
            Preset::Android => &["kt", "java", "xml"],
        }
    }

    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            Preset::Swift => &[SWIFT_PATTERN],
            Preset::Javascript => &[JAVASCRIPT_PATTERN],
            Preset::Android => &[ANDROID_PATTERN],
        }
    }
}

/// User-defined extraction rule from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CustomExtractor {
    pub name: String,
    pub extensions: Vec<String>,
    pub patterns: Vec<String>,
}

/// An entry of the `extractors` config list: a preset name or a custom rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ExtractorConfig {
    Preset(Preset),
    Custom(CustomExtractor),
}

/// A compiled extraction rule.
#[derive(Debug)]
pub struct Extractor {
    pub name: String,
    pub extensions: Vec<String>,
    pub patterns: Vec<Regex>,
    /// Presets that see no files of their type stay quiet; configured ones warn.
    pub explicit: bool,
}

/// A single pattern hit inside a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub pattern_index: usize,
    /// Byte offset of the match start.
    pub offset: usize,
    pub text: String,
}

impl Extractor {
    fn compile(
        name: &str,
        extensions: &[String],
        patterns: &[String],
        explicit: bool,
    ) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    AuditError::Config(format!("extractor '{}' pattern \"{}\": {}", name, p, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            extensions: extensions.iter().map(|e| normalize_extension(e)).collect(),
            patterns,
            explicit,
        })
    }

    /// Apply every pattern to `text`; the first participating capture group
    /// of each match is the captured raw text.
    pub fn find_matches(&self, text: &str) -> Vec<RawMatch> {
        let mut matches = Vec::new();
        for (pattern_index, regex) in self.patterns.iter().enumerate() {
            for caps in regex.captures_iter(text) {
                let Some(captured) = caps.iter().skip(1).flatten().next() else {
                    continue;
                };
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                matches.push(RawMatch {
                    pattern_index,
                    offset: whole.start(),
                    text: captured.as_str().to_string(),
                });
            }
        }
        matches
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

/// Extractors indexed by file extension.
#[derive(Debug, Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Extractor>,
    by_extension: HashMap<String, Vec<usize>>,
}

impl ExtractorRegistry {
    /// Compile extractor configs. `explicit` marks presets as user-chosen.
    pub fn from_configs(configs: &[ExtractorConfig], explicit: bool) -> Result<Self> {
        let mut registry = Self::default();
        for config in configs {
            let extractor = match config {
                ExtractorConfig::Preset(preset) => Extractor::compile(
                    preset.name(),
                    &to_strings(preset.extensions()),
                    &to_strings(preset.patterns()),
                    explicit,
                )?,
                ExtractorConfig::Custom(custom) => {
                    Extractor::compile(&custom.name, &custom.extensions, &custom.patterns, true)?
                }
            };
            registry.push(extractor);
        }
        Ok(registry)
    }

    fn push(&mut self, extractor: Extractor) {
        let index = self.extractors.len();
        for ext in &extractor.extensions {
            self.by_extension.entry(ext.clone()).or_default().push(index);
        }
        self.extractors.push(extractor);
    }

    pub fn extractors(&self) -> &[Extractor] {
        &self.extractors
    }

    /// Indices of the extractors that apply to `path`.
    pub fn for_path(&self, path: &Path) -> &[usize] {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.by_extension.get(&normalize_extension(e)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_scannable(&self, path: &Path) -> bool {
        !self.for_path(path).is_empty()
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
