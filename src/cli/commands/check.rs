use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use super::super::{args::CheckCommand, exit_status::ExitStatus};
use super::{CheckSummary, CommandResult, CommandSummary, FixSummary};
use crate::{
    config::{Config, ConfigLoadResult, Glossary, load_config},
    core::{
        Catalog, CatalogFormatKind, ExtractorRegistry, ReconcileOptions, apply_fixes,
        extract_references, load_catalog, reconcile, save_catalog, validate_locale,
    },
};

const FALLBACK_SOURCE_LOCALE: &str = "en";

/// Everything a check run needs, after merging CLI flags over the config file.
#[derive(Debug)]
struct CheckSettings {
    root: PathBuf,
    catalog_path: PathBuf,
    catalog_display: String,
    catalog_format: CatalogFormatKind,
    source_locale: Option<String>,
    locales: Vec<String>,
    ignores: Vec<String>,
    glossary: Glossary,
    registry: ExtractorRegistry,
    output: Option<PathBuf>,
}

impl CheckSettings {
    fn resolve(cmd: &CheckCommand, loaded: ConfigLoadResult, cwd: &Path) -> Result<Self> {
        let ConfigLoadResult {
            config,
            base_dir,
            explicit_extractors,
            ..
        } = loaded;
        let Config {
            root,
            catalog,
            catalog_format,
            source_locale,
            locales,
            ignores,
            extractors,
            glossary,
        } = config;
        let common = &cmd.common;

        let root = match &common.root {
            Some(path) => cwd.join(path),
            None => base_dir.join(root),
        };
        let (catalog_path, catalog_display) = match &common.catalog {
            Some(path) => (cwd.join(path), path.display().to_string()),
            None => (base_dir.join(&catalog), catalog),
        };
        let catalog_format = common
            .catalog_format
            .or(catalog_format)
            .unwrap_or_else(|| CatalogFormatKind::detect(&catalog_path));

        let registry = ExtractorRegistry::from_configs(&extractors, explicit_extractors)
            .context("Invalid extractor configuration")?;

        Ok(Self {
            root,
            catalog_path,
            catalog_display,
            catalog_format,
            source_locale: common.source_locale.clone().or(source_locale),
            locales: if cmd.locales.is_empty() {
                locales
            } else {
                cmd.locales.clone()
            },
            ignores,
            glossary,
            registry,
            output: cmd.output.as_ref().map(|p| cwd.join(p)),
        })
    }
}

pub fn check(cmd: CheckCommand) -> Result<CommandResult> {
    let cwd = env::current_dir()?;
    let settings = CheckSettings::resolve(&cmd, load_config(&cwd)?, &cwd)?;

    // Fail on bad locale codes before touching the file system.
    if let Some(source) = &settings.source_locale {
        validate_locale(source)?;
    }
    for locale in &settings.locales {
        validate_locale(locale)?;
    }

    let extraction = extract_references(&settings.root, &settings.registry, &settings.ignores)?;

    let codec = settings.catalog_format.codec();
    // Fix mode may start a catalog from scratch.
    let create_catalog = cmd.fix && !settings.catalog_path.exists();
    let mut catalog = if create_catalog {
        Catalog::new(None)
    } else {
        load_catalog(&settings.catalog_path, &codec)?
    };

    let source_locale = settings
        .source_locale
        .clone()
        .or_else(|| catalog.source_locale.clone())
        .unwrap_or_else(|| FALLBACK_SOURCE_LOCALE.to_string());
    if create_catalog {
        catalog.source_locale = Some(source_locale.clone());
    }

    let options = ReconcileOptions {
        source_locale,
        target_locales: settings.locales.clone(),
        glossary: settings.glossary.clone(),
    };
    let mut report = reconcile(&extraction.keys(), &catalog, &options)?;
    report.files_scanned = extraction.files_scanned;
    report.warnings = extraction.warnings;
    report.warnings.extend(catalog.warnings.iter().cloned());

    let fix = if cmd.fix {
        let added = apply_fixes(&mut catalog, &report, &codec);
        let target = settings.output.as_ref().unwrap_or(&settings.catalog_path);
        let written_to = if added > 0 || settings.output.is_some() {
            save_catalog(&catalog, target, &codec)?;
            Some(match &cmd.output {
                Some(path) => path.display().to_string(),
                None => settings.catalog_display.clone(),
            })
        } else {
            None
        };
        Some(FixSummary { added, written_to })
    } else {
        None
    };

    let exit_status = ExitStatus::from_bits(report.exit_bits());
    Ok(CommandResult {
        summary: CommandSummary::Check(CheckSummary {
            report,
            format: cmd.format,
            catalog_path: settings.catalog_display,
            fix,
        }),
        exit_status,
    })
}
