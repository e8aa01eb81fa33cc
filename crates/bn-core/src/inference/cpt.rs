//! Conditional probability lookup.
//!
//! A CPT row is selected by the parents' value indices read as a mixed-radix
//! number with the **last listed parent least significant**. For parents
//! `(b, c)` over binary domains the rows are `(b0,c0) (b0,c1) (b1,c0) (b1,c1)`.
//! The BIF reader places rows with the same function, so the layout is
//! defined in exactly one place: [`bn_math::try_row_index`].

use crate::network::{Network, Variable};
use bn_common::VariableId;
use thiserror::Error;

/// A CPT lookup that falls outside the table or the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("'{variable}' has an empty CPT")]
    EmptyTable { variable: String },

    #[error("'{variable}': value index {value_index} outside row of width {width}")]
    ValueOutOfRange {
        variable: String,
        value_index: usize,
        width: usize,
    },

    #[error("'{variable}': parent '{parent}' is not in the network")]
    UnknownParent { variable: String, parent: String },

    #[error("'{variable}': parent '{parent}' (id {parent_id}) is not assigned; configuration covers {assigned} variables")]
    ParentNotAssigned {
        variable: String,
        parent: String,
        parent_id: VariableId,
        assigned: usize,
    },

    #[error("'{variable}': parent '{parent}' has value index {value_index} but only {cardinality} values")]
    ParentValueOutOfRange {
        variable: String,
        parent: String,
        value_index: usize,
        cardinality: usize,
    },

    #[error("'{variable}': row {} outside table of {rows} rows", describe_row(.row))]
    RowOutOfRange {
        variable: String,
        row: Option<usize>,
        rows: usize,
    },
}

fn describe_row(row: &Option<usize>) -> String {
    row.map_or_else(|| "index overflow".to_string(), |r| r.to_string())
}

impl LookupError {
    /// Name of the variable whose table was being read.
    pub fn variable(&self) -> &str {
        match self {
            LookupError::EmptyTable { variable }
            | LookupError::ValueOutOfRange { variable, .. }
            | LookupError::UnknownParent { variable, .. }
            | LookupError::ParentNotAssigned { variable, .. }
            | LookupError::ParentValueOutOfRange { variable, .. }
            | LookupError::RowOutOfRange { variable, .. } => variable,
        }
    }
}

impl From<LookupError> for bn_common::Error {
    fn from(err: LookupError) -> Self {
        bn_common::Error::Lookup {
            variable: err.variable().to_string(),
            message: err.to_string(),
        }
    }
}

/// `P(variable = values[value_index] | parents as assigned in ancestors)`.
///
/// `ancestors[id]` is the value index of the variable with topological id
/// `id`; it must cover every parent of `variable`.
pub fn conditional_probability(
    variable: &Variable,
    ancestors: &[usize],
    value_index: usize,
    network: &Network,
) -> Result<f64, LookupError> {
    if variable.cpt.is_empty() {
        return Err(LookupError::EmptyTable {
            variable: variable.name.clone(),
        });
    }

    let row = if variable.is_root() {
        0
    } else {
        row_for(variable, ancestors, network)?
    };

    let entries = variable
        .cpt
        .get(row)
        .ok_or_else(|| LookupError::RowOutOfRange {
            variable: variable.name.clone(),
            row: Some(row),
            rows: variable.cpt.len(),
        })?;

    entries
        .get(value_index)
        .copied()
        .ok_or_else(|| LookupError::ValueOutOfRange {
            variable: variable.name.clone(),
            value_index,
            width: entries.len(),
        })
}

fn row_for(variable: &Variable, ancestors: &[usize], network: &Network) -> Result<usize, LookupError> {
    let row = bn_math::try_row_index(variable.parents.len(), |pos| {
        let parent = &variable.parents[pos];
        let parent_var =
            network
                .variable_by_name(parent)
                .ok_or_else(|| LookupError::UnknownParent {
                    variable: variable.name.clone(),
                    parent: parent.clone(),
                })?;
        let digit = *ancestors.get(parent_var.id.index()).ok_or_else(|| {
            LookupError::ParentNotAssigned {
                variable: variable.name.clone(),
                parent: parent.clone(),
                parent_id: parent_var.id,
                assigned: ancestors.len(),
            }
        })?;
        if digit >= parent_var.cardinality() {
            return Err(LookupError::ParentValueOutOfRange {
                variable: variable.name.clone(),
                parent: parent.clone(),
                value_index: digit,
                cardinality: parent_var.cardinality(),
            });
        }
        Ok((digit, parent_var.cardinality()))
    })?;

    row.ok_or_else(|| LookupError::RowOutOfRange {
        variable: variable.name.clone(),
        row: None,
        rows: variable.cpt.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bif::{parse_bif, GRADIENT_BIF};
    use crate::graph::prepare;
    use crate::network::NetworkBuilder;
    use bn_config::CyclePolicy;

    fn gradient() -> Network {
        prepare(&parse_bif(GRADIENT_BIF).unwrap(), CyclePolicy::Reject).unwrap()
    }

    /// Ancestor vector with the named variables set and everything else 0.
    fn assign(net: &Network, pairs: &[(&str, usize)]) -> Vec<usize> {
        let mut out = vec![0; net.len()];
        for (name, v) in pairs {
            out[net.id_of(name).unwrap().index()] = *v;
        }
        out
    }

    #[test]
    fn root_reads_single_row() {
        let net = gradient();
        let a = net.variable_by_name("a").unwrap();
        assert_eq!(conditional_probability(a, &[], 0, &net).unwrap(), 0.5);
        assert_eq!(conditional_probability(a, &[], 1, &net).unwrap(), 0.5);
    }

    #[test]
    fn last_parent_is_least_significant() {
        let net = gradient();
        let e = net.variable_by_name("e").unwrap();
        // e | a, c, d with a=true(0), c=false(1), d=true(0) -> row 0b010 = 2 -> 0.75
        let cfg = assign(&net, &[("a", 0), ("c", 1), ("d", 0)]);
        assert_eq!(conditional_probability(e, &cfg, 0, &net).unwrap(), 0.75);
        // a=false, c=true, d=true -> row 0b100 = 4 -> 0.8
        let cfg = assign(&net, &[("a", 1), ("c", 0), ("d", 0)]);
        assert_eq!(conditional_probability(e, &cfg, 0, &net).unwrap(), 0.8);
        assert_eq!(conditional_probability(e, &cfg, 1, &net).unwrap(), 0.2);
    }

    #[test]
    fn two_parent_table() {
        let net = gradient();
        let d = net.variable_by_name("d").unwrap();
        // d | b, c: (true, false) -> row 1 -> 0.7
        let cfg = assign(&net, &[("b", 0), ("c", 1)]);
        assert_eq!(conditional_probability(d, &cfg, 0, &net).unwrap(), 0.7);
    }

    #[test]
    fn missing_parent_assignment_is_reported() {
        let net = gradient();
        let e = net.variable_by_name("e").unwrap();
        let err = conditional_probability(e, &[0], 0, &net).unwrap_err();
        assert!(matches!(err, LookupError::ParentNotAssigned { .. }), "{err}");
        assert_eq!(err.variable(), "e");
    }

    #[test]
    fn value_index_past_row_is_reported() {
        let net = gradient();
        let a = net.variable_by_name("a").unwrap();
        let err = conditional_probability(a, &[], 2, &net).unwrap_err();
        assert_eq!(
            err,
            LookupError::ValueOutOfRange {
                variable: "a".into(),
                value_index: 2,
                width: 2
            }
        );
        let common: bn_common::Error = err.into();
        assert_eq!(common.code(), 30);
    }

    #[test]
    fn parent_digit_out_of_range_is_reported() {
        let net = gradient();
        let b = net.variable_by_name("b").unwrap();
        let cfg = assign(&net, &[("a", 5)]);
        assert!(matches!(
            conditional_probability(b, &cfg, 0, &net),
            Err(LookupError::ParentValueOutOfRange { value_index: 5, .. })
        ));
    }

    #[test]
    fn short_table_is_reported() {
        let mut builder = NetworkBuilder::new(None);
        builder.add_variable("p", ["x", "y", "z"]).unwrap();
        builder.add_variable("q", ["t", "f"]).unwrap();
        builder
            .set_distribution("p", [""; 0], vec![vec![0.2, 0.3, 0.5]])
            .unwrap();
        builder
            .set_distribution("q", ["p"], vec![vec![0.5, 0.5]; 2])
            .unwrap();
        let net = builder.build().unwrap();
        let q = net.variable_by_name("q").unwrap();
        assert_eq!(
            conditional_probability(q, &[2], 0, &net).unwrap_err(),
            LookupError::RowOutOfRange {
                variable: "q".into(),
                row: Some(2),
                rows: 2
            }
        );
    }

    #[test]
    fn empty_table_is_reported() {
        let mut builder = NetworkBuilder::new(None);
        builder.add_variable("p", ["x"]).unwrap();
        builder.set_distribution("p", [""; 0], vec![]).unwrap();
        let net = builder.build().unwrap();
        let p = net.variable_by_name("p").unwrap();
        assert!(matches!(
            conditional_probability(p, &[], 0, &net),
            Err(LookupError::EmptyTable { .. })
        ));
    }
}
