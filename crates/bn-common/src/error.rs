//! Error types for Bayesian network inference.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Unknown Evidence Variable
//!   Reason: evidence names unknown variable 'rain'
//!   Fix: Check the spelling against 'bn-core show', evidence names are case-sensitive.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 40,
//!   "category": "query",
//!   "message": "evidence names unknown variable 'rain'",
//!   "recoverable": true,
//!   "context": { "variable": "rain" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for inference operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Network description could not be read or is malformed.
    Input,
    /// Graph structure violations (cycles, bad permutations).
    Structure,
    /// CPT lookups that fall outside the table.
    Lookup,
    /// Evidence or query naming things the network does not contain.
    Query,
    /// Enumeration limits and numerical problems.
    Inference,
    /// Engine configuration errors.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Structure => write!(f, "structure"),
            ErrorCategory::Lookup => write!(f, "lookup"),
            ErrorCategory::Query => write!(f, "query"),
            ErrorCategory::Inference => write!(f, "inference"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for the workspace.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("network description could not be parsed: {0}")]
    Parse(String),

    #[error("invalid network: {0}")]
    InvalidNetwork(String),

    // Structure errors (20-29)
    #[error("cycle detected: edge {from} -> {to} closes a loop")]
    Cycle { from: String, to: String },

    #[error("invalid variable ordering: {0}")]
    InvalidPermutation(String),

    #[error("network is not topologically indexed: {0}")]
    NotTopological(String),

    // Lookup errors (30-39)
    #[error("CPT lookup failed for '{variable}': {message}")]
    Lookup { variable: String, message: String },

    // Query errors (40-49)
    #[error("evidence names unknown variable '{variable}'")]
    UnknownEvidenceVariable { variable: String },

    #[error("evidence value '{value}' is not declared for variable '{variable}'")]
    UnknownEvidenceValue { variable: String, value: String },

    #[error("malformed evidence: {0}")]
    MalformedEvidence(String),

    #[error("query names unknown variable '{variable}'")]
    UnknownQueryVariable { variable: String },

    // Inference errors (50-59)
    #[error("joint state space of {states} configurations exceeds the limit of {limit}")]
    StateSpaceTooLarge { states: String, limit: u64 },

    #[error("network has no variables")]
    EmptyNetwork,

    // Config errors (60-69)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    // I/O errors (70-79)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Input errors
    /// - 20-29: Structure errors
    /// - 30-39: Lookup errors
    /// - 40-49: Query errors
    /// - 50-59: Inference errors
    /// - 60-69: Config errors
    /// - 70-79: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Parse(_) => 10,
            Error::InvalidNetwork(_) => 11,
            Error::Cycle { .. } => 20,
            Error::InvalidPermutation(_) => 21,
            Error::NotTopological(_) => 22,
            Error::Lookup { .. } => 30,
            Error::UnknownEvidenceVariable { .. } => 40,
            Error::UnknownEvidenceValue { .. } => 41,
            Error::MalformedEvidence(_) => 42,
            Error::UnknownQueryVariable { .. } => 43,
            Error::StateSpaceTooLarge { .. } => 50,
            Error::EmptyNetwork => 51,
            Error::Config(_) => 60,
            Error::InvalidConfig(_) => 61,
            Error::Io(_) => 70,
            Error::Json(_) => 71,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Parse(_) | Error::InvalidNetwork(_) => ErrorCategory::Input,

            Error::Cycle { .. } | Error::InvalidPermutation(_) | Error::NotTopological(_) => {
                ErrorCategory::Structure
            }

            Error::Lookup { .. } => ErrorCategory::Lookup,

            Error::UnknownEvidenceVariable { .. }
            | Error::UnknownEvidenceValue { .. }
            | Error::MalformedEvidence(_)
            | Error::UnknownQueryVariable { .. } => ErrorCategory::Query,

            Error::StateSpaceTooLarge { .. } | Error::EmptyNetwork => ErrorCategory::Inference,

            Error::Config(_) | Error::InvalidConfig(_) => ErrorCategory::Config,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable by changing inputs.
    ///
    /// Structural and lookup errors mean the network itself is broken;
    /// query and config errors can be fixed by the caller.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Parse(_) => true,
            Error::InvalidNetwork(_) => true,

            Error::Cycle { .. } => false,
            Error::InvalidPermutation(_) => false,
            Error::NotTopological(_) => false,

            Error::Lookup { .. } => false,

            Error::UnknownEvidenceVariable { .. } => true,
            Error::UnknownEvidenceValue { .. } => true,
            Error::MalformedEvidence(_) => true,
            Error::UnknownQueryVariable { .. } => true,

            Error::StateSpaceTooLarge { .. } => true, // Raise the limit
            Error::EmptyNetwork => true,

            Error::Config(_) => true,
            Error::InvalidConfig(_) => true,

            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Parse(_) => {
                "Fix the reported line in the network file. Run 'bn-core check -f <file>' after editing."
            }
            Error::InvalidNetwork(_) => {
                "Every variable needs a 'variable' block and exactly one 'probability' block."
            }
            Error::Cycle { .. } => {
                "Bayesian networks must be acyclic. Remove one of the parent declarations that forms the loop."
            }
            Error::InvalidPermutation(_) => {
                "The ordering must list every variable id exactly once. This is a bug if produced internally."
            }
            Error::NotTopological(_) => {
                "Reindex the network in topological order before enumerating it."
            }
            Error::Lookup { .. } => {
                "The CPT does not match the parents' value counts. Run 'bn-core check' to list malformed tables."
            }
            Error::UnknownEvidenceVariable { .. } => {
                "Check the spelling against 'bn-core show', evidence names are case-sensitive."
            }
            Error::UnknownEvidenceValue { .. } => {
                "Use one of the values declared in the variable's 'type discrete' list."
            }
            Error::MalformedEvidence(_) => {
                "Evidence is a comma-separated list of name=value pairs, e.g. 'a=true,c=false'."
            }
            Error::UnknownQueryVariable { .. } => {
                "Query a variable listed by 'bn-core show', or omit -q to print every variable."
            }
            Error::StateSpaceTooLarge { .. } => {
                "Exact enumeration is exponential in the number of variables. Raise max_joint_states in engine.json or shrink the network."
            }
            Error::EmptyNetwork => "The network file declares no variables.",
            Error::Config(_) => "Check the syntax of engine.json, or remove it to use built-in defaults.",
            Error::InvalidConfig(_) => {
                "Fix the reported field in engine.json. Probabilistic thresholds must be finite and non-negative."
            }
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Parse(_) => "Network Parse Error",
            Error::InvalidNetwork(_) => "Invalid Network",
            Error::Cycle { .. } => "Cycle Detected",
            Error::InvalidPermutation(_) => "Invalid Variable Ordering",
            Error::NotTopological(_) => "Network Not Topologically Ordered",
            Error::Lookup { .. } => "CPT Lookup Error",
            Error::UnknownEvidenceVariable { .. } => "Unknown Evidence Variable",
            Error::UnknownEvidenceValue { .. } => "Unknown Evidence Value",
            Error::MalformedEvidence(_) => "Malformed Evidence",
            Error::UnknownQueryVariable { .. } => "Unknown Query Variable",
            Error::StateSpaceTooLarge { .. } => "State Space Too Large",
            Error::EmptyNetwork => "Empty Network",
            Error::Config(_) => "Configuration Error",
            Error::InvalidConfig(_) => "Invalid Configuration",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., variable name).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::Cycle { from, to } => {
                context.insert("from".to_string(), serde_json::json!(from));
                context.insert("to".to_string(), serde_json::json!(to));
            }
            Error::Lookup { variable, .. }
            | Error::UnknownEvidenceVariable { variable }
            | Error::UnknownQueryVariable { variable } => {
                context.insert("variable".to_string(), serde_json::json!(variable));
            }
            Error::UnknownEvidenceValue { variable, value } => {
                context.insert("variable".to_string(), serde_json::json!(variable));
                context.insert("value".to_string(), serde_json::json!(value));
            }
            Error::StateSpaceTooLarge { states, limit } => {
                context.insert("states".to_string(), serde_json::json!(states));
                context.insert("limit".to_string(), serde_json::json!(limit));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::Parse("x".into()).code(), 10);
        assert_eq!(
            Error::Cycle {
                from: "a".into(),
                to: "b".into()
            }
            .code(),
            20
        );
        assert_eq!(
            Error::UnknownEvidenceVariable {
                variable: "x".into()
            }
            .code(),
            40
        );
        assert_eq!(Error::EmptyNetwork.code(), 51);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(Error::Parse("x".into()).category(), ErrorCategory::Input);
        assert_eq!(
            Error::InvalidPermutation("x".into()).category(),
            ErrorCategory::Structure
        );
        assert_eq!(
            Error::MalformedEvidence("x".into()).category(),
            ErrorCategory::Query
        );
        assert_eq!(
            Error::StateSpaceTooLarge {
                states: "1".into(),
                limit: 0
            }
            .category(),
            ErrorCategory::Inference
        );
    }

    #[test]
    fn test_error_recoverable() {
        assert!(Error::MalformedEvidence("x".into()).is_recoverable());
        assert!(!Error::Cycle {
            from: "a".into(),
            to: "b".into()
        }
        .is_recoverable());
        assert!(!Error::Lookup {
            variable: "a".into(),
            message: "row 9".into()
        }
        .is_recoverable());
    }

    #[test]
    fn test_structured_error_context() {
        let err = Error::UnknownEvidenceValue {
            variable: "a".into(),
            value: "maybe".into(),
        };
        let structured = StructuredError::from(&err);

        assert_eq!(structured.code, 41);
        assert_eq!(structured.category, ErrorCategory::Query);
        assert_eq!(structured.context.get("variable"), Some(&serde_json::json!("a")));
        assert_eq!(structured.context.get("value"), Some(&serde_json::json!("maybe")));
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::Cycle {
            from: "a".into(),
            to: "b".into(),
        };
        let json = StructuredError::from(&err).to_json();

        assert!(json.contains(r#""code":20"#));
        assert!(json.contains(r#""category":"structure""#));
        assert!(json.contains(r#""recoverable":false"#));
    }

    #[test]
    fn test_structured_error_with_context() {
        let structured =
            StructuredError::from(&Error::EmptyNetwork).with_context("file", "net.bif");
        assert_eq!(
            structured.context.get("file"),
            Some(&serde_json::json!("net.bif"))
        );
    }

    #[test]
    fn test_format_error_human() {
        let err = Error::UnknownEvidenceVariable {
            variable: "rain".into(),
        };
        let formatted = format_error_human(&err, false);

        assert!(formatted.contains("Unknown Evidence Variable"));
        assert!(formatted.contains("evidence names unknown variable 'rain'"));
        assert!(formatted.contains("case-sensitive"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Structure.to_string(), "structure");
        assert_eq!(ErrorCategory::Query.to_string(), "query");
    }
}
