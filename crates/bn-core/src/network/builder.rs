//! Incremental construction of a [`Network`].
//!
//! Variables receive ids in the order they are added. Distributions may be
//! attached in any order once the variables they mention exist. The builder
//! checks names and references only; table shapes are reported by
//! [`super::validate_network`] and enforced at lookup time.

use super::{Network, Variable};
use bn_common::VariableId;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors raised while assembling a network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("variable name must not be empty")]
    EmptyName,

    #[error("variable '{0}' is declared twice")]
    DuplicateVariable(String),

    #[error("variable '{0}' has no values")]
    EmptyDomain(String),

    #[error("variable '{variable}' lists value '{value}' twice")]
    DuplicateValue { variable: String, value: String },

    #[error("probability block for undeclared variable '{0}'")]
    UnknownVariable(String),

    #[error("variable '{variable}' has undeclared parent '{parent}'")]
    UnknownParent { variable: String, parent: String },

    #[error("variable '{variable}' lists parent '{parent}' twice")]
    DuplicateParent { variable: String, parent: String },

    #[error("variable '{0}' has more than one probability block")]
    DuplicateDistribution(String),

    #[error("variable '{0}' has no probability block")]
    MissingDistribution(String),
}

impl From<NetworkError> for bn_common::Error {
    fn from(err: NetworkError) -> Self {
        bn_common::Error::InvalidNetwork(err.to_string())
    }
}

#[derive(Debug)]
struct Pending {
    name: String,
    values: Vec<String>,
    distribution: Option<(Vec<String>, Vec<Vec<f64>>)>,
}

/// Builder for [`Network`].
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    name: Option<String>,
    pending: Vec<Pending>,
    ids: HashMap<String, VariableId>,
}

impl NetworkBuilder {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Declare a variable and its ordered domain. Returns the assigned id.
    pub fn add_variable<N, I, S>(&mut self, name: N, values: I) -> Result<VariableId, NetworkError>
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(NetworkError::EmptyName);
        }
        if self.ids.contains_key(&name) {
            return Err(NetworkError::DuplicateVariable(name));
        }
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(NetworkError::EmptyDomain(name));
        }
        let mut seen = HashSet::with_capacity(values.len());
        for value in &values {
            if !seen.insert(value.as_str()) {
                return Err(NetworkError::DuplicateValue {
                    variable: name,
                    value: value.clone(),
                });
            }
        }

        let id = VariableId(self.pending.len());
        self.ids.insert(name.clone(), id);
        self.pending.push(Pending {
            name,
            values,
            distribution: None,
        });
        Ok(id)
    }

    /// Attach the CPT for `target`.
    ///
    /// `rows[r]` is the distribution for parent configuration `r`, where `r` is
    /// the mixed-radix index with the last parent least significant.
    pub fn set_distribution<P, S>(
        &mut self,
        target: &str,
        parents: P,
        rows: Vec<Vec<f64>>,
    ) -> Result<(), NetworkError>
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self
            .ids
            .get(target)
            .copied()
            .ok_or_else(|| NetworkError::UnknownVariable(target.to_string()))?;

        let parents: Vec<String> = parents.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(parents.len());
        for parent in &parents {
            if !self.ids.contains_key(parent) {
                return Err(NetworkError::UnknownParent {
                    variable: target.to_string(),
                    parent: parent.clone(),
                });
            }
            if !seen.insert(parent.as_str()) {
                return Err(NetworkError::DuplicateParent {
                    variable: target.to_string(),
                    parent: parent.clone(),
                });
            }
        }

        let slot = &mut self.pending[id.index()].distribution;
        if slot.is_some() {
            return Err(NetworkError::DuplicateDistribution(target.to_string()));
        }
        *slot = Some((parents, rows));
        Ok(())
    }

    /// Whether `name` has been declared.
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    /// Declared domain of `name`.
    pub fn values_of(&self, name: &str) -> Option<&[String]> {
        self.ids
            .get(name)
            .map(|id| self.pending[id.index()].values.as_slice())
    }

    /// Finish the network. Every variable needs a distribution.
    pub fn build(self) -> Result<Network, NetworkError> {
        let mut variables = Vec::with_capacity(self.pending.len());
        for (index, pending) in self.pending.into_iter().enumerate() {
            let (parents, cpt) = pending
                .distribution
                .ok_or_else(|| NetworkError::MissingDistribution(pending.name.clone()))?;
            variables.push(Variable {
                name: pending.name,
                values: pending.values,
                parents,
                cpt,
                id: VariableId(index),
            });
        }

        let mut children = vec![Vec::new(); variables.len()];
        for variable in &variables {
            for parent in &variable.parents {
                // Checked in set_distribution.
                if let Some(pid) = self.ids.get(parent) {
                    children[pid.index()].push(variable.id);
                }
            }
        }

        Ok(Network::from_parts(self.name, variables, children))
    }
}
