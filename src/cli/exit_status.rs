use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): no findings
/// - `Findings(bits)`: OR of the exit bits of every non-empty category
///   (1 missing-from-catalog, 2 missing-translation, 4 stale)
/// - `Error` (8): fatal error, no report was produced
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Findings(u8),
    Error,
}

impl ExitStatus {
    pub const ERROR_CODE: u8 = 8;

    pub fn from_bits(bits: u8) -> Self {
        if bits == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Findings(bits)
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Findings(bits) => ExitCode::from(bits),
            ExitStatus::Error => ExitCode::from(ExitStatus::ERROR_CODE),
        }
    }
}
