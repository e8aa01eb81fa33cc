//! Data-integrity checks for a built network.
//!
//! Nothing here fails: every problem becomes a [`NetworkIssue`] so that
//! `bn-core check` can list them all at once.

use super::Network;
use bn_math::{checked_product, is_probability, stable_sum};
use serde::Serialize;

/// One problem found in a CPT.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkIssue {
    /// The table does not have one row per parent configuration.
    RowCount {
        variable: String,
        expected: Option<usize>,
        actual: usize,
    },
    /// A row's width differs from the variable's cardinality.
    RowWidth {
        variable: String,
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// A row does not sum to one within tolerance.
    RowSum {
        variable: String,
        row: usize,
        sum: f64,
    },
    /// An entry is negative, above one, or not finite.
    InvalidEntry {
        variable: String,
        row: usize,
        column: usize,
        value: f64,
    },
}

impl std::fmt::Display for NetworkIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkIssue::RowCount {
                variable,
                expected: Some(expected),
                actual,
            } => write!(f, "{variable}: expected {expected} CPT rows, found {actual}"),
            NetworkIssue::RowCount {
                variable, actual, ..
            } => write!(
                f,
                "{variable}: parent configurations overflow, found {actual} CPT rows"
            ),
            NetworkIssue::RowWidth {
                variable,
                row,
                expected,
                actual,
            } => write!(
                f,
                "{variable}: row {row} has {actual} entries, expected {expected}"
            ),
            NetworkIssue::RowSum { variable, row, sum } => {
                write!(f, "{variable}: row {row} sums to {sum}")
            }
            NetworkIssue::InvalidEntry {
                variable,
                row,
                column,
                value,
            } => write!(f, "{variable}: entry [{row}][{column}] = {value} is not a probability"),
        }
    }
}

/// All issues found in one network.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub variables: usize,
    pub edges: usize,
    pub issues: Vec<NetworkIssue>,
}

impl ValidationReport {
    /// True when no issue was found.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check every CPT's shape and contents.
///
/// `tolerance` bounds how far a row sum may drift from 1.0.
pub fn validate_network(network: &Network, tolerance: f64) -> ValidationReport {
    let mut issues = Vec::new();

    for variable in network.variables() {
        let radices = variable.parents.iter().map(|p| {
            network
                .variable_by_name(p)
                .map(|v| v.cardinality())
                .unwrap_or(0)
        });
        let expected = checked_product(radices);
        if expected != Some(variable.cpt.len()) {
            issues.push(NetworkIssue::RowCount {
                variable: variable.name.clone(),
                expected,
                actual: variable.cpt.len(),
            });
        }

        for (row_idx, row) in variable.cpt.iter().enumerate() {
            if row.len() != variable.cardinality() {
                issues.push(NetworkIssue::RowWidth {
                    variable: variable.name.clone(),
                    row: row_idx,
                    expected: variable.cardinality(),
                    actual: row.len(),
                });
            }

            let mut entries_ok = true;
            for (col, &p) in row.iter().enumerate() {
                if !is_probability(p, 0.0) {
                    entries_ok = false;
                    issues.push(NetworkIssue::InvalidEntry {
                        variable: variable.name.clone(),
                        row: row_idx,
                        column: col,
                        value: p,
                    });
                }
            }

            let sum = stable_sum(row.iter().copied());
            if entries_ok && (sum - 1.0).abs() > tolerance {
                issues.push(NetworkIssue::RowSum {
                    variable: variable.name.clone(),
                    row: row_idx,
                    sum,
                });
            }
        }
    }

    ValidationReport {
        variables: network.len(),
        edges: network.edges().count(),
        issues,
    }
}
