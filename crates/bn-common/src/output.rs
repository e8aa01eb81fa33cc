//! Output format specifications.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Supported output formats for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured JSON (default for machine consumption)
    #[default]
    Json,

    /// Human-readable Markdown tables
    Md,

    /// Plain-text listing, one distribution per block
    Summary,
}

impl OutputFormat {
    /// Whether this format is meant to be parsed by a program.
    pub fn is_machine_readable(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Md => write!(f, "md"),
            OutputFormat::Summary => write!(f, "summary"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Md.to_string(), "md");
        assert_eq!(OutputFormat::Summary.to_string(), "summary");
    }

    #[test]
    fn test_output_format_machine_readable() {
        assert!(OutputFormat::Json.is_machine_readable());
        assert!(!OutputFormat::Summary.is_machine_readable());
    }
}
