use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::{
    catalog::CatalogFormatKind,
    extract::{ExtractorConfig, Preset},
};

pub const CONFIG_FILE_NAME: &str = ".locauditrc.json";

pub const DEFAULT_IGNORES: &[&str] = &[
    "**/node_modules/**",
    "**/.git/**",
    "**/.build/**",
    "**/Pods/**",
    "**/DerivedData/**",
    "**/build/**",
];

/// Glossary: source term -> locale -> required rendering.
pub type Glossary = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default = "default_catalog")]
    pub catalog: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_format: Option<CatalogFormatKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_locale: Option<String>,
    #[serde(default)]
    pub locales: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_extractors")]
    pub extractors: Vec<ExtractorConfig>,
    #[serde(default)]
    pub glossary: Glossary,
}

fn default_root() -> String {
    "./".to_string()
}

fn default_catalog() -> String {
    "Localizable.xcstrings".to_string()
}

fn default_ignores() -> Vec<String> {
    DEFAULT_IGNORES.iter().map(|s| s.to_string()).collect()
}

fn default_extractors() -> Vec<ExtractorConfig> {
    Preset::all().into_iter().map(ExtractorConfig::Preset).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: default_root(),
            catalog: default_catalog(),
            catalog_format: None,
            source_locale: None,
            locales: Vec::new(),
            ignores: default_ignores(),
            extractors: default_extractors(),
            glossary: Glossary::new(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob in `ignores` or any regex of a custom
    /// extractor is invalid, or if a custom extractor has no capture group.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        for extractor in &self.extractors {
            let ExtractorConfig::Custom(custom) = extractor else {
                continue;
            };
            if custom.extensions.is_empty() {
                anyhow::bail!("Extractor '{}' has no 'extensions'", custom.name);
            }
            for pattern in &custom.patterns {
                let regex = Regex::new(pattern).with_context(|| {
                    format!(
                        "Invalid regex in extractor '{}': \"{}\"",
                        custom.name, pattern
                    )
                })?;
                if regex.captures_len() < 2 {
                    anyhow::bail!(
                        "Pattern \"{}\" in extractor '{}' has no capture group",
                        pattern,
                        custom.name
                    );
                }
            }
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Directory containing the config file; relative paths resolve against it.
    pub base_dir: PathBuf,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
    /// True if the file lists `extractors` itself instead of relying on the
    /// default presets.
    pub explicit_extractors: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let value: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            let explicit_extractors = value.get("extractors").is_some();
            let config: Config = serde_json::from_value(value)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf());
            Ok(ConfigLoadResult {
                config,
                base_dir,
                from_file: true,
                explicit_extractors,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            base_dir: start_dir.to_path_buf(),
            from_file: false,
            explicit_extractors: false,
        }),
    }
}
