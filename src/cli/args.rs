//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `check`: Audit source keys against the catalog
//! - `init`: Write a default configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::core::CatalogFormatKind;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Check(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Arguments that override the configuration file.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Source tree to scan (overrides config file)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Catalog file (overrides config file)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Catalog format (default: detected from the file extension)
    #[arg(long, value_enum)]
    pub catalog_format: Option<CatalogFormatKind>,

    /// Source locale (default: config file, then the catalog, then "en")
    #[arg(long)]
    pub source_locale: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Grouped, human-readable text
    #[default]
    Text,
    /// Structured JSON document on stdout
    Json,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Target locale to audit; repeatable (default: every catalog locale
    /// except the source locale)
    #[arg(long = "locale", value_name = "LOCALE")]
    pub locales: Vec<String>,

    /// Add untranslated entries for keys missing from the catalog
    #[arg(long)]
    pub fix: bool,

    /// Write the fixed catalog here instead of overwriting the input
    #[arg(long, requires = "fix")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report missing, untranslated and stale keys
    Check(CheckCommand),
    /// Initialize a new .locauditrc.json configuration file
    Init,
}
