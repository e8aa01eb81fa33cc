//! Relabel a network so that ids follow a given order.

use super::{topological_order, GraphError, PermutationFault};
use crate::network::{Network, Variable};
use bn_common::VariableId;
use bn_config::CyclePolicy;
use tracing::debug;

/// Build a new network in which `order[k]` receives id `k`.
///
/// Variable content (values, parent names, CPT) is copied as is. Only ids and
/// the adjacency lists are remapped. `order` must be a permutation of all of
/// `original`'s ids.
pub fn reindex(original: &Network, order: &[VariableId]) -> Result<Network, GraphError> {
    let n = original.len();
    if order.len() != n {
        return Err(GraphError::InvalidPermutation(PermutationFault::Length {
            expected: n,
            actual: order.len(),
        }));
    }

    let mut old_to_new: Vec<Option<VariableId>> = vec![None; n];
    for (new, &old) in order.iter().enumerate() {
        let slot = old_to_new
            .get_mut(old.index())
            .ok_or(GraphError::InvalidPermutation(PermutationFault::OutOfRange(old)))?;
        if slot.is_some() {
            return Err(GraphError::InvalidPermutation(PermutationFault::Duplicate(
                old,
            )));
        }
        *slot = Some(VariableId(new));
    }
    // Length matches and no duplicates, so every slot is filled.
    let old_to_new: Vec<VariableId> = old_to_new.into_iter().flatten().collect();

    let mut variables = Vec::with_capacity(n);
    let mut children = Vec::with_capacity(n);
    for (new, &old) in order.iter().enumerate() {
        let source = &original.variables()[old.index()];
        variables.push(Variable {
            id: VariableId(new),
            ..source.clone()
        });
        children.push(
            original
                .children(old)
                .iter()
                .map(|c| old_to_new[c.index()])
                .collect(),
        );
    }

    debug!(target: "bn_core::graph", variables = n, "network reindexed");
    Ok(Network::from_parts(
        original.name().map(str::to_string),
        variables,
        children,
    ))
}

/// Sort `network` topologically and reindex it in that order.
pub fn prepare(network: &Network, policy: CyclePolicy) -> Result<Network, GraphError> {
    let order = topological_order(network, policy)?;
    reindex(network, &order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bif::{parse_bif, GRADIENT_BIF};

    fn gradient() -> Network {
        parse_bif(GRADIENT_BIF).unwrap()
    }

    #[test]
    fn identity_order_is_a_copy() {
        let net = gradient();
        let order: Vec<VariableId> = (0..net.len()).map(VariableId).collect();
        assert_eq!(reindex(&net, &order).unwrap(), net);
    }

    #[test]
    fn reversed_order_remaps_ids_and_edges() {
        let net = gradient();
        let order: Vec<VariableId> = (0..net.len()).rev().map(VariableId).collect();
        let out = reindex(&net, &order).unwrap();

        assert_eq!(out.id_of("a"), Some(VariableId(4)));
        assert_eq!(out.id_of("e"), Some(VariableId(0)));
        assert_eq!(out.edges().count(), net.edges().count());
        for (parent, child) in out.edges() {
            let child_var = out.variable(child).unwrap();
            assert!(child_var.parents.iter().any(|p| out.id_of(p) == Some(parent)));
        }
        let a = out.variable_by_name("a").unwrap();
        assert_eq!(a.cpt, net.variable_by_name("a").unwrap().cpt);
    }

    #[test]
    fn prepare_yields_topological_ids() {
        let out = prepare(&gradient(), CyclePolicy::Reject).unwrap();
        assert!(out.is_topologically_indexed());
        assert_eq!(out.len(), 5);
        for (k, v) in out.variables().iter().enumerate() {
            assert_eq!(v.id, VariableId(k));
        }
    }

    #[test]
    fn rejects_wrong_length() {
        let net = gradient();
        let err = reindex(&net, &[VariableId(0)]).unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidPermutation(PermutationFault::Length {
                expected: 5,
                actual: 1
            })
        );
    }

    #[test]
    fn rejects_out_of_range_and_duplicates() {
        let net = gradient();
        let bad = [0, 1, 2, 3, 9].map(VariableId);
        assert_eq!(
            reindex(&net, &bad).unwrap_err(),
            GraphError::InvalidPermutation(PermutationFault::OutOfRange(VariableId(9)))
        );
        let dup = [0, 1, 2, 3, 3].map(VariableId);
        assert_eq!(
            reindex(&net, &dup).unwrap_err(),
            GraphError::InvalidPermutation(PermutationFault::Duplicate(VariableId(3)))
        );
        let common: bn_common::Error = reindex(&net, &dup).unwrap_err().into();
        assert_eq!(common.code(), 21);
    }
}
