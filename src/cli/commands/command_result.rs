use super::super::{args::OutputFormat, exit_status::ExitStatus};
use crate::core::AuditReport;

#[derive(Debug)]
pub enum CommandSummary {
    Check(CheckSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct CheckSummary {
    pub report: AuditReport,
    pub format: OutputFormat,
    /// Catalog path as given by the user or the config file.
    pub catalog_path: String,
    /// Present when running with `--fix`.
    pub fix: Option<FixSummary>,
}

#[derive(Debug)]
pub struct FixSummary {
    pub added: usize,
    /// Path the catalog was written to; `None` if nothing needed writing.
    pub written_to: Option<String>,
}

#[derive(Debug)]
pub struct InitSummary {
    pub path: String,
}

/// Result of running a locaudit command.
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    pub exit_status: ExitStatus,
}
