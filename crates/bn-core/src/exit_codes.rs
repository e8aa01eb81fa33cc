//! Exit codes for the bn-core CLI.
//!
//! Exit code ranges:
//! - 0-1: Operational outcomes (parse outcome from code, not output)
//! - 10-19: User/input errors (recoverable by changing arguments or files)
//! - 20-29: Internal errors (bugs, should be reported)

use bn_common::ErrorCategory;

/// Exit codes for bn-core operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Clean = 0,

    /// Inference ran but the evidence has zero probability; marginals are all zero.
    ZeroEvidence = 1,

    /// Invalid command-line arguments.
    ArgsError = 10,

    /// Network file could not be parsed, or its tables are unusable.
    InputError = 11,

    /// Evidence or query names an unknown variable or value.
    QueryError = 12,

    /// Graph structure problem (cycle, bad ordering).
    StructureError = 13,

    /// Engine configuration missing or invalid.
    ConfigError = 14,

    /// Internal error (bug - please report).
    InternalError = 20,

    /// I/O error.
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates a completed run (codes 0-1).
    pub fn is_success(self) -> bool {
        (self as i32) < 10
    }

    /// Check if this exit code is a user/input error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Check if this exit code is an internal error (codes 20-29).
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ZeroEvidence => "OK_ZERO_EVIDENCE",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::QueryError => "ERR_QUERY",
            ExitCode::StructureError => "ERR_STRUCTURE",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&bn_common::Error> for ExitCode {
    fn from(err: &bn_common::Error) -> Self {
        match err.category() {
            ErrorCategory::Input | ErrorCategory::Lookup | ErrorCategory::Inference => {
                ExitCode::InputError
            }
            ErrorCategory::Query => ExitCode::QueryError,
            ErrorCategory::Structure => ExitCode::StructureError,
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Io => match err {
                bn_common::Error::Json(_) => ExitCode::InternalError,
                _ => ExitCode::IoError,
            },
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
