//! Report for `bn-core infer`.

use super::{fmt_probability, md_cell, Render};
use crate::evidence::Evidence;
use crate::inference::{Distribution, InferenceResult};
use bn_common::SCHEMA_VERSION;
use bn_math::Normalization;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use tracing::warn;

/// One variable's marginal as it appears in the report.
#[derive(Debug, Clone, Serialize)]
pub struct MarginalEntry {
    pub variable: String,
    /// Observed value when the variable is part of the evidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,
    pub distribution: Distribution,
    pub sum: f64,
}

impl MarginalEntry {
    pub fn is_observed(&self) -> bool {
        self.observed.is_some()
    }
}

/// Inference output with run metadata.
#[derive(Debug, Clone, Serialize)]
pub struct InferReport {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    pub evidence: Evidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub evidence_probability: f64,
    pub normalization: Normalization,
    pub normalized: bool,
    pub joint_states: usize,
    pub lookup_failures: usize,
    /// Marginals in variable-name order, restricted to the query if one was given.
    pub marginals: Vec<MarginalEntry>,
    pub warnings: Vec<String>,
}

impl InferReport {
    /// Build a report from an inference result.
    ///
    /// `query` restricts the marginals to one variable and must name a
    /// variable of the result. Distributions whose mass deviates from 1 by more
    /// than `sum_tolerance` produce a warning, except when the evidence was
    /// impossible and every marginal is zero by construction.
    pub fn new(
        run_id: impl Into<String>,
        network: Option<&str>,
        result: &InferenceResult,
        query: Option<&str>,
        sum_tolerance: f64,
    ) -> bn_common::Result<Self> {
        if let Some(q) = query {
            if result.marginal(q).is_none() {
                return Err(bn_common::Error::UnknownQueryVariable {
                    variable: q.to_string(),
                });
            }
        }

        let mut warnings = Vec::new();
        if result.is_degenerate() {
            warnings.push(format!(
                "evidence {} has zero probability; all marginals are zero",
                result.evidence
            ));
        }

        let marginals: Vec<MarginalEntry> = result
            .marginals
            .iter()
            .filter(|(name, _)| query.map_or(true, |q| q == name.as_str()))
            .map(|(name, dist)| MarginalEntry {
                variable: name.clone(),
                observed: result.evidence.get(name).map(str::to_string),
                distribution: dist.clone(),
                sum: dist.sum(),
            })
            .collect();

        if result.normalized {
            for entry in &marginals {
                if (entry.sum - 1.0).abs() > sum_tolerance {
                    warn!(
                        target: "bn_core::output",
                        variable = %entry.variable,
                        sum = entry.sum,
                        "distribution does not sum to 1"
                    );
                    warnings.push(format!(
                        "probabilities for {} sum to {}, not 1",
                        entry.variable, entry.sum
                    ));
                }
            }
        }

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            run_id: run_id.into(),
            network: network.map(str::to_string),
            evidence: result.evidence.clone(),
            query: query.map(str::to_string),
            evidence_probability: result.evidence_probability,
            normalization: result.normalization,
            normalized: result.normalized,
            joint_states: result.joint_states,
            lookup_failures: result.lookup_failures,
            marginals,
            warnings,
        })
    }

    /// `P(x)` or `P(x | E)` depending on whether evidence was given.
    fn heading(&self, variable: &str) -> String {
        if self.evidence.is_empty() {
            format!("P({variable})")
        } else {
            format!("P({variable} | E)")
        }
    }
}

impl Render for InferReport {
    fn to_markdown(&self) -> String {
        let mut out = String::new();
        let title = self.network.as_deref().unwrap_or("network");
        let _ = writeln!(out, "# Inference: {}\n", md_cell(title));
        if self.evidence.is_empty() {
            let _ = writeln!(out, "Evidence: none\n");
        } else {
            let _ = writeln!(out, "Evidence: `{}`\n", self.evidence);
            let _ = writeln!(
                out,
                "P(E) = {}\n",
                fmt_probability(self.evidence_probability)
            );
        }

        for entry in &self.marginals {
            if let Some(value) = &entry.observed {
                let _ = writeln!(
                    out,
                    "## {} = {} (fixed by evidence)\n",
                    md_cell(&entry.variable),
                    md_cell(value)
                );
                continue;
            }
            let _ = writeln!(out, "## {}\n", md_cell(&self.heading(&entry.variable)));
            let _ = writeln!(out, "| Value | Probability |");
            let _ = writeln!(out, "|-------|-------------|");
            for (label, p) in entry.distribution.iter() {
                let _ = writeln!(out, "| {} | {} |", md_cell(label), fmt_probability(p));
            }
            let _ = writeln!(out);
        }

        if !self.warnings.is_empty() {
            let _ = writeln!(out, "## Warnings\n");
            for w in &self.warnings {
                let _ = writeln!(out, "- {}", w);
            }
        }
        out
    }

    fn to_summary(&self) -> String {
        let mut out = String::new();
        for entry in &self.marginals {
            if let Some(value) = &entry.observed {
                let _ = writeln!(
                    out,
                    "P({} = {}) is fixed by evidence.",
                    entry.variable, value
                );
                continue;
            }
            let _ = writeln!(out, "{}:", self.heading(&entry.variable));
            for (label, p) in entry.distribution.iter() {
                let _ = writeln!(out, "  {} -> {}", label, fmt_probability(p));
            }
            let _ = writeln!(out, "  (Sum: {})", fmt_probability(entry.sum));
        }
        for w in &self.warnings {
            let _ = writeln!(out, "warning: {}", w);
        }
        out
    }
}
