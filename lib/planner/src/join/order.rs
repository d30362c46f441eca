use crate::graph::{JoinGraph, NodeSet};
use crate::join::{PlanNode, PlanRef, SubtreeInterner};
use rdf_federation_common::ContractViolation;
use std::fmt;

/// Turns the node set of a join component into a join tree.
///
/// The node set must be non-empty and connected in `graph`. Implementations should obtain leaves
/// and intermediate joins through `subtrees` such that identical sub-plans are shared across
/// components.
pub trait JoinOrderPlanner: fmt::Debug + Send + Sync {
    fn plan(
        &self,
        graph: &JoinGraph,
        nodes: &NodeSet,
        subtrees: &SubtreeInterner,
    ) -> Result<PlanRef, ContractViolation>;
}

/// Builds a left-deep join tree without considering costs.
///
/// The tree starts with the lowest node. Afterward, the lowest remaining node that is joinable
/// with any node already in the tree is attached, until all nodes are part of the tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArbitraryJoinOrder;

impl JoinOrderPlanner for ArbitraryJoinOrder {
    fn plan(
        &self,
        graph: &JoinGraph,
        nodes: &NodeSet,
        subtrees: &SubtreeInterner,
    ) -> Result<PlanRef, ContractViolation> {
        let Some(root) = nodes.first() else {
            return Err(ContractViolation::EmptyNodeSet);
        };

        let mut sequence = vec![root];
        let mut included = NodeSet::singleton(root);
        let mut pending = nodes.without(root);
        let mut tree = subtrees.leaf(graph, root)?;

        while !pending.is_empty() {
            let next = pending
                .iter()
                .find(|&candidate| included.iter().any(|node| graph.is_joinable(node, candidate)))
                .ok_or_else(|| ContractViolation::DisconnectedNodeSet {
                    nodes: nodes.iter().collect(),
                    pending: pending.iter().collect(),
                })?;

            let leaf = subtrees.leaf(graph, next)?;
            sequence.push(next);
            included.insert(next);
            pending.remove(next);

            let lhs = tree;
            tree = subtrees.canonicalize(&sequence, move || PlanNode::join(lhs, leaf));
        }

        Ok(tree)
    }
}
