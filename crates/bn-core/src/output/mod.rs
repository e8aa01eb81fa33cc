//! Rendering command results for stdout.
//!
//! Every report is a serde-serializable struct. JSON output is the struct
//! itself; `md` and `summary` are hand-formatted views of the same data.

pub mod infer;
pub mod network;

pub use infer::{InferReport, MarginalEntry};
pub use network::{CheckReport, ShowReport, VariableSummary};

use bn_common::OutputFormat;

/// A report that can be written in every [`OutputFormat`].
pub trait Render: serde::Serialize {
    /// Markdown view.
    fn to_markdown(&self) -> String;

    /// Compact plain-text view.
    fn to_summary(&self) -> String;
}

/// Render `report` in `format`. JSON is pretty-printed.
pub fn render<R: Render>(report: &R, format: OutputFormat) -> bn_common::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Md => Ok(report.to_markdown()),
        OutputFormat::Summary => Ok(report.to_summary()),
    }
}

/// Probabilities are shown with six decimals in human output.
pub(crate) fn fmt_probability(p: f64) -> String {
    format!("{p:.6}")
}

/// Escape a label for a Markdown table cell.
pub(crate) fn md_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
