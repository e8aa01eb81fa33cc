//! Graph ordering: topological sort and reindexing.

pub mod reindex;
pub mod topo;

pub use reindex::{prepare, reindex};
pub use topo::topological_order;

use bn_common::VariableId;
use thiserror::Error;

/// Why an ordering is not a permutation of the network's ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermutationFault {
    Length { expected: usize, actual: usize },
    OutOfRange(VariableId),
    Duplicate(VariableId),
}

impl std::fmt::Display for PermutationFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermutationFault::Length { expected, actual } => {
                write!(f, "expected {expected} ids, got {actual}")
            }
            PermutationFault::OutOfRange(id) => write!(f, "id {id} is out of range"),
            PermutationFault::Duplicate(id) => write!(f, "id {id} appears more than once"),
        }
    }
}

/// Structural errors from sorting or reindexing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("cycle detected: edge {from} -> {to} closes a loop")]
    Cycle {
        from: String,
        to: String,
        from_id: VariableId,
        to_id: VariableId,
    },

    #[error("invalid variable ordering: {0}")]
    InvalidPermutation(PermutationFault),
}

impl From<GraphError> for bn_common::Error {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Cycle { from, to, .. } => bn_common::Error::Cycle { from, to },
            GraphError::InvalidPermutation(fault) => {
                bn_common::Error::InvalidPermutation(fault.to_string())
            }
        }
    }
}
