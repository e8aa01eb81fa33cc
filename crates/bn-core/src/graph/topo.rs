//! Depth-first topological sort.
//!
//! Roots are tried in ascending id order and children in adjacency order, so
//! the same network always yields the same sequence. The result is the reverse
//! of the DFS finishing order. The traversal keeps its own stack so long
//! chains cannot overflow the thread stack.

use super::GraphError;
use crate::logging::{event_names, Stage};
use crate::network::Network;
use bn_common::VariableId;
use bn_config::CyclePolicy;
use tracing::{debug, warn};

/// Order `network`'s ids so that every parent precedes its children.
///
/// With [`CyclePolicy::Reject`] the first back edge found is returned as
/// [`GraphError::Cycle`]. With [`CyclePolicy::Warn`] the back edge is logged
/// and skipped; the result is still a permutation of all ids but is not a
/// valid topological order.
pub fn topological_order(
    network: &Network,
    policy: CyclePolicy,
) -> Result<Vec<VariableId>, GraphError> {
    let n = network.len();
    let mut visited = vec![false; n];
    let mut on_stack = vec![false; n];
    let mut finished = Vec::with_capacity(n);
    // (node, index of the next child to visit)
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut back_edges = 0usize;

    for root in 0..n {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        on_stack[root] = true;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let children = network.children(VariableId(node));
            let Some(&child) = children.get(frame.1) else {
                on_stack[node] = false;
                finished.push(VariableId(node));
                stack.pop();
                continue;
            };
            frame.1 += 1;

            let c = child.index();
            if on_stack[c] {
                let from = network.name_of(VariableId(node)).unwrap_or("?").to_string();
                let to = network.name_of(child).unwrap_or("?").to_string();
                match policy {
                    CyclePolicy::Reject => {
                        return Err(GraphError::Cycle {
                            from,
                            to,
                            from_id: VariableId(node),
                            to_id: child,
                        });
                    }
                    CyclePolicy::Warn => {
                        back_edges += 1;
                        warn!(
                            target: "bn_core::graph",
                            event = event_names::SORT_CYCLE,
                            stage = %Stage::Sort,
                            from = %from,
                            to = %to,
                            "cycle detected, continuing with a non-topological order"
                        );
                    }
                }
            } else if !visited[c] {
                visited[c] = true;
                on_stack[c] = true;
                stack.push((c, 0));
            }
        }
    }

    finished.reverse();
    debug!(
        target: "bn_core::graph",
        variables = n,
        back_edges,
        "topological order computed"
    );
    Ok(finished)
}
