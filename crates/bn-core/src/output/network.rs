//! Reports for `bn-core show` and `bn-core check`.

use super::{md_cell, Render};
use crate::network::{Network, NetworkIssue, ValidationReport};
use bn_common::{VariableId, SCHEMA_VERSION};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

/// A variable as listed by `show`.
#[derive(Debug, Clone, Serialize)]
pub struct VariableSummary {
    pub id: VariableId,
    pub name: String,
    pub values: Vec<String>,
    pub parents: Vec<String>,
    pub cpt: Vec<Vec<f64>>,
}

/// Outgoing edges of one variable.
#[derive(Debug, Clone, Serialize)]
pub struct AdjacencyEntry {
    pub id: VariableId,
    pub name: String,
    pub children: Vec<String>,
}

fn adjacency(network: &Network) -> Vec<AdjacencyEntry> {
    network
        .variables()
        .iter()
        .map(|v| AdjacencyEntry {
            id: v.id,
            name: v.name.clone(),
            children: network
                .children(v.id)
                .iter()
                .filter_map(|&c| network.name_of(c))
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

/// Parsed network, its adjacency and the topological renumbering.
#[derive(Debug, Clone, Serialize)]
pub struct ShowReport {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    pub variables: Vec<VariableSummary>,
    pub adjacency: Vec<AdjacencyEntry>,
    /// Variable names in topological order.
    pub topological_order: Vec<String>,
    /// Adjacency after renumbering in topological order.
    pub reindexed_adjacency: Vec<AdjacencyEntry>,
}

impl ShowReport {
    /// `original` as declared, `order` from the sorter and the reindexed network.
    pub fn new(original: &Network, order: &[VariableId], reindexed: &Network) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            network: original.name().map(str::to_string),
            variables: original
                .variables()
                .iter()
                .map(|v| VariableSummary {
                    id: v.id,
                    name: v.name.clone(),
                    values: v.values.clone(),
                    parents: v.parents.clone(),
                    cpt: v.cpt.clone(),
                })
                .collect(),
            adjacency: adjacency(original),
            topological_order: order
                .iter()
                .filter_map(|&id| original.name_of(id))
                .map(str::to_string)
                .collect(),
            reindexed_adjacency: adjacency(reindexed),
        }
    }
}

fn write_adjacency(out: &mut String, entries: &[AdjacencyEntry], markdown: bool) {
    for entry in entries {
        let children = entry.children.join(", ");
        if markdown {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                entry.id,
                md_cell(&entry.name),
                md_cell(&children)
            );
        } else {
            let _ = writeln!(out, "  {} (id {}) -> {}", entry.name, entry.id, children);
        }
    }
}

impl Render for ShowReport {
    fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "# Network: {}\n",
            md_cell(self.network.as_deref().unwrap_or("(unnamed)"))
        );
        let _ = writeln!(out, "## Variables\n");
        let _ = writeln!(out, "| Id | Name | Values | Parents | CPT rows |");
        let _ = writeln!(out, "|----|------|--------|---------|----------|");
        for v in &self.variables {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                v.id,
                md_cell(&v.name),
                md_cell(&v.values.join(", ")),
                md_cell(&v.parents.join(", ")),
                v.cpt.len()
            );
        }

        let _ = writeln!(out, "\n## Adjacency\n");
        let _ = writeln!(out, "| Id | Name | Children |");
        let _ = writeln!(out, "|----|------|----------|");
        write_adjacency(&mut out, &self.adjacency, true);

        let _ = writeln!(
            out,
            "\n## Topological order\n\n{}\n",
            md_cell(&self.topological_order.join(" → "))
        );

        let _ = writeln!(out, "## Reindexed adjacency\n");
        let _ = writeln!(out, "| Id | Name | Children |");
        let _ = writeln!(out, "|----|------|----------|");
        write_adjacency(&mut out, &self.reindexed_adjacency, true);
        out
    }

    fn to_summary(&self) -> String {
        let mut out = String::new();
        for v in &self.variables {
            let _ = writeln!(out, "Variable: {} (id {})", v.name, v.id);
            let _ = writeln!(out, "  Values: {}", v.values.join(" "));
            if !v.parents.is_empty() {
                let _ = writeln!(out, "  Parents: {}", v.parents.join(" "));
            }
            let _ = writeln!(out, "  CPT:");
            for row in &v.cpt {
                let cells: Vec<String> = row.iter().map(f64::to_string).collect();
                let _ = writeln!(out, "    {}", cells.join(" "));
            }
        }
        let _ = writeln!(out, "Adjacency:");
        write_adjacency(&mut out, &self.adjacency, false);
        let _ = writeln!(out, "Topological order: {}", self.topological_order.join(" "));
        let _ = writeln!(out, "Reindexed adjacency:");
        write_adjacency(&mut out, &self.reindexed_adjacency, false);
        out
    }
}

/// Result of `bn-core check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    pub clean: bool,
    pub variables: usize,
    pub edges: usize,
    /// Size of the joint state space, absent on overflow.
    pub joint_states: Option<usize>,
    /// Set when the graph has a cycle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<String>,
    pub issues: Vec<NetworkIssue>,
}

impl CheckReport {
    pub fn new(network: &Network, validation: ValidationReport, cycle: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            network: network.name().map(str::to_string),
            clean: validation.is_clean() && cycle.is_none(),
            variables: validation.variables,
            edges: validation.edges,
            joint_states: network.joint_state_count(),
            cycle,
            issues: validation.issues,
        }
    }
}

impl Render for CheckReport {
    fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "# Check: {}\n",
            md_cell(self.network.as_deref().unwrap_or("(unnamed)"))
        );
        let _ = writeln!(out, "| Variables | Edges | Joint states |");
        let _ = writeln!(out, "|-----------|-------|--------------|");
        let _ = writeln!(
            out,
            "| {} | {} | {} |\n",
            self.variables,
            self.edges,
            self.joint_states
                .map_or_else(|| "overflow".to_string(), |s| s.to_string())
        );
        if let Some(cycle) = &self.cycle {
            let _ = writeln!(out, "**Cycle:** {}\n", md_cell(cycle));
        }
        if self.issues.is_empty() {
            let _ = writeln!(out, "No CPT issues found.");
        } else {
            let _ = writeln!(out, "## Issues\n");
            for issue in &self.issues {
                let _ = writeln!(out, "- {}", md_cell(&issue.to_string()));
            }
        }
        out
    }

    fn to_summary(&self) -> String {
        let mut out = String::new();
        let status = if self.clean { "ok" } else { "problems found" };
        let _ = writeln!(
            out,
            "{}: {} variables, {} edges, {}",
            self.network.as_deref().unwrap_or("network"),
            self.variables,
            self.edges,
            status
        );
        if let Some(cycle) = &self.cycle {
            let _ = writeln!(out, "  cycle: {}", cycle);
        }
        for issue in &self.issues {
            let _ = writeln!(out, "  {}", issue);
        }
        out
    }
}
