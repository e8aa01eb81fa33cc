//! Variable identity types.
//!
//! A variable id is a dense index into the network that currently owns it.
//! Ids are only meaningful relative to one network instance: the same variable
//! usually carries a different id before and after topological reindexing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense, zero-based variable identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(pub usize);

impl VariableId {
    /// Position of this variable in id-indexed storage.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for VariableId {
    fn from(id: usize) -> Self {
        VariableId(id)
    }
}

impl From<VariableId> for usize {
    fn from(id: VariableId) -> Self {
        id.0
    }
}
