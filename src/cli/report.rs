//! Report formatting and printing utilities.
//!
//! Text output groups findings by category and always prints a count line
//! per category, including zero counts. JSON output is one document on
//! stdout. Warnings go to stderr in text mode and into the document in JSON
//! mode.

use std::{
    collections::BTreeMap,
    io::{self, Write},
};

use colored::Colorize;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use super::{
    args::OutputFormat,
    commands::{CheckSummary, CommandResult, CommandSummary, FixSummary, InitSummary},
};
use crate::{
    core::{AuditReport, MissingKey},
    issues::{Advisory, AuditWarning, Category},
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Maximum number of references to display per missing key.
const MAX_REFERENCES_DISPLAY: usize = 3;

pub fn print(result: &CommandResult, verbose: bool) {
    match &result.summary {
        CommandSummary::Check(summary) => {
            let mut stdout = io::stdout().lock();
            let mut stderr = io::stderr().lock();
            match summary.format {
                OutputFormat::Text => {
                    report_to(summary, &mut stdout);
                    print_warnings_to(&summary.report.warnings, verbose, &mut stderr);
                }
                OutputFormat::Json => print_json_to(summary, &mut stdout),
            }
        }
        CommandSummary::Init(summary) => print_init_to(summary, &mut io::stdout().lock()),
    }
}

/// Print the human-readable report to a custom writer.
pub fn report_to<W: Write>(summary: &CheckSummary, writer: &mut W) {
    let report = &summary.report;
    let catalog = summary.catalog_path.as_str();

    print_missing_from_catalog(&report.missing_from_catalog, writer);
    print_missing_translation(report, catalog, writer);
    print_stale(report, catalog, writer);
    print_advisories(&report.advisories, writer);

    if let Some(fix) = &summary.fix {
        print_fix(fix, writer);
    }

    print_summary(report, catalog, writer);
}

/// Print warnings; per-file warnings are collapsed into one line unless
/// `verbose` is set.
pub fn print_warnings_to<W: Write>(warnings: &[AuditWarning], verbose: bool, writer: &mut W) {
    let mut skipped_files = 0;
    for warning in warnings {
        if warning.is_per_file() && !verbose {
            skipped_files += 1;
            continue;
        }
        let _ = writeln!(writer, "{} {}", "warning:".bold().yellow(), warning);
    }

    if skipped_files > 0 {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be read (use {} for details)",
            "warning:".bold().yellow(),
            skipped_files,
            "-v".cyan()
        );
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a AuditReport,
    counts: BTreeMap<Category, usize>,
    exit_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<JsonFix<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonFix<'a> {
    added: usize,
    written_to: Option<&'a str>,
}

/// Print the report as a JSON document to a custom writer.
pub fn print_json_to<W: Write>(summary: &CheckSummary, writer: &mut W) {
    let report = &summary.report;
    let output = JsonOutput {
        report,
        counts: Category::all()
            .into_iter()
            .map(|c| (c, report.count(c)))
            .collect(),
        exit_code: report.exit_bits(),
        fix: summary.fix.as_ref().map(|fix| JsonFix {
            added: fix.added,
            written_to: fix.written_to.as_deref(),
        }),
    };

    if serde_json::to_writer_pretty(&mut *writer, &output).is_ok() {
        let _ = writeln!(writer);
    }
}

pub fn print_init_to<W: Write>(summary: &InitSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Created {}", summary.path).green()
    );
}

// ============================================================
// Internal Functions
// ============================================================

fn print_count_line<W: Write>(count: usize, text: String, writer: &mut W) {
    if count == 0 {
        let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), text);
    } else {
        let _ = writeln!(writer, "{} {}", FAILURE_MARK.red(), text.bold());
    }
}

fn print_missing_from_catalog<W: Write>(missing: &[MissingKey], writer: &mut W) {
    print_count_line(
        missing.len(),
        format!("{} missing from catalog", plural(missing.len(), "key", "keys")),
        writer,
    );

    // file:line column width, measured in terminal cells
    let width = missing
        .iter()
        .flat_map(|m| m.references.iter().take(MAX_REFERENCES_DISPLAY))
        .map(|r| UnicodeWidthStr::width(location(&r.file, r.line).as_str()))
        .max()
        .unwrap_or(0);

    for item in missing {
        let total = item.references.len();
        for reference in item.references.iter().take(MAX_REFERENCES_DISPLAY) {
            let loc = location(&reference.file, reference.line);
            let padding = width - UnicodeWidthStr::width(loc.as_str());
            let _ = writeln!(
                writer,
                "  {}{}  \"{}\"",
                loc.blue(),
                " ".repeat(padding),
                item.key
            );
        }
        if total > MAX_REFERENCES_DISPLAY {
            let _ = writeln!(
                writer,
                "  {}  (and {} more)",
                " ".repeat(width),
                total - MAX_REFERENCES_DISPLAY
            );
        }
    }
    let _ = writeln!(writer);
}

fn print_missing_translation<W: Write>(report: &AuditReport, catalog: &str, writer: &mut W) {
    if report.locales.is_empty() {
        print_count_line(
            0,
            "0 keys missing a translation (no target locales)".to_string(),
            writer,
        );
        let _ = writeln!(writer);
        return;
    }

    for (locale, keys) in &report.missing_translation {
        print_count_line(
            keys.len(),
            format!(
                "{} missing a translation for '{}' in {}",
                plural(keys.len(), "key", "keys"),
                locale,
                catalog
            ),
            writer,
        );
        for key in keys {
            let _ = writeln!(writer, "  \"{}\"", key);
        }
    }
    let _ = writeln!(writer);
}

fn print_stale<W: Write>(report: &AuditReport, catalog: &str, writer: &mut W) {
    print_count_line(
        report.stale.len(),
        format!(
            "{} in {}",
            plural(report.stale.len(), "stale key", "stale keys"),
            catalog
        ),
        writer,
    );
    for key in &report.stale {
        let _ = writeln!(writer, "  \"{}\"", key);
    }
    let _ = writeln!(writer);
}

fn print_advisories<W: Write>(advisories: &[Advisory], writer: &mut W) {
    for advisory in advisories {
        let _ = writeln!(
            writer,
            "{} [{}] \"{}\": {}  {}",
            "note:".bold().cyan(),
            advisory.locale,
            advisory.key,
            advisory.message,
            advisory.kind.to_string().dimmed().cyan()
        );
    }
    if !advisories.is_empty() {
        let _ = writeln!(writer);
    }
}

fn print_fix<W: Write>(fix: &FixSummary, writer: &mut W) {
    match &fix.written_to {
        Some(path) => {
            let _ = writeln!(
                writer,
                "{} {} to {}",
                "Added".green().bold(),
                plural(fix.added, "entry", "entries"),
                path
            );
        }
        None => {
            let _ = writeln!(writer, "{}", "No entries to add".green());
        }
    }
}

fn print_summary<W: Write>(report: &AuditReport, catalog: &str, writer: &mut W) {
    if report.is_clean() {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "Checked {} against {} ({}) - no issues found",
                plural(report.files_scanned, "source file", "source files"),
                catalog,
                plural(report.catalog_entries, "entry", "entries")
            )
            .green()
        );
        return;
    }

    let missing = report.count(Category::MissingFromCatalog);
    let untranslated = report.count(Category::MissingTranslation);
    let stale = report.count(Category::Stale);
    let _ = writeln!(
        writer,
        "{} {} ({} missing from catalog, {} missing {}, {} stale)",
        FAILURE_MARK.red(),
        plural(missing + untranslated + stale, "problem", "problems"),
        missing,
        untranslated,
        if untranslated == 1 {
            "translation"
        } else {
            "translations"
        },
        stale
    );
}

fn location(file: &str, line: usize) -> String {
    format!("{}:{}", file, line)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}

// ============================================================
// Tests
// ============================================================
