//! Network model: variables, CPTs and the parent → child adjacency.
//!
//! A [`Network`] is immutable once built. Ids are dense (`0..len`) and index
//! directly into the variable vector. Whether those ids follow declaration
//! order or topological order depends on which stage produced the network;
//! see [`crate::graph::reindex`].

pub mod builder;
pub mod validate;

pub use builder::{NetworkBuilder, NetworkError};
pub use validate::{validate_network, NetworkIssue, ValidationReport};

use bn_common::VariableId;
use serde::Serialize;
use std::collections::HashMap;

/// One discrete random variable and its conditional probability table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    /// Unique name within the network.
    pub name: String,
    /// Outcome labels; a value index is a position in this list.
    pub values: Vec<String>,
    /// Parent names. The order fixes the CPT row layout (last parent varies fastest).
    pub parents: Vec<String>,
    /// One row per parent configuration, each a distribution over `values`.
    pub cpt: Vec<Vec<f64>>,
    /// Dense id within the owning network.
    pub id: VariableId,
}

impl Variable {
    /// Number of values in the domain.
    pub fn cardinality(&self) -> usize {
        self.values.len()
    }

    /// Position of `label` in the domain.
    pub fn value_index(&self, label: &str) -> Option<usize> {
        self.values.iter().position(|v| v == label)
    }

    /// True when the variable has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// A discrete Bayesian network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Network {
    name: Option<String>,
    variables: Vec<Variable>,
    children: Vec<Vec<VariableId>>,
    #[serde(skip)]
    name_to_id: HashMap<String, VariableId>,
}

impl Network {
    /// Assemble a network from variables already carrying their final ids.
    ///
    /// `variables[k].id` must equal `k` and `children` must hold one list per
    /// variable; callers inside the crate guarantee both.
    pub(crate) fn from_parts(
        name: Option<String>,
        variables: Vec<Variable>,
        children: Vec<Vec<VariableId>>,
    ) -> Self {
        debug_assert_eq!(variables.len(), children.len());
        debug_assert!(variables.iter().enumerate().all(|(k, v)| v.id.index() == k));
        let name_to_id = variables
            .iter()
            .map(|v| (v.name.clone(), v.id))
            .collect();
        Self {
            name,
            variables,
            children,
            name_to_id,
        }
    }

    /// Network name from the description, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Variable with the given id.
    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    /// Variable with the given name.
    pub fn variable_by_name(&self, name: &str) -> Option<&Variable> {
        self.id_of(name).and_then(|id| self.variable(id))
    }

    /// Id currently assigned to `name`.
    pub fn id_of(&self, name: &str) -> Option<VariableId> {
        self.name_to_id.get(name).copied()
    }

    /// Name of the variable with the given id.
    pub fn name_of(&self, id: VariableId) -> Option<&str> {
        self.variable(id).map(|v| v.name.as_str())
    }

    /// Children of `id`, in the order the edges were recorded.
    pub fn children(&self, id: VariableId) -> &[VariableId] {
        self.children
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All variables, indexed by id.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Every `parent -> child` edge, grouped by parent id.
    pub fn edges(&self) -> impl Iterator<Item = (VariableId, VariableId)> + '_ {
        self.children
            .iter()
            .enumerate()
            .flat_map(|(parent, kids)| kids.iter().map(move |&child| (VariableId(parent), child)))
    }

    /// True when every edge goes from a lower id to a higher id.
    ///
    /// A linear sweep over ids then visits each variable after all of its parents.
    pub fn is_topologically_indexed(&self) -> bool {
        self.edges().all(|(parent, child)| parent < child)
    }

    /// Size of the joint state space, or `None` on overflow.
    pub fn joint_state_count(&self) -> Option<usize> {
        bn_math::checked_product(self.variables.iter().map(Variable::cardinality))
    }
}
