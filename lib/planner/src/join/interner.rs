use crate::diagnostics::PlanningDiagnostics;
use crate::graph::JoinGraph;
use crate::join::{PlanNode, PlanRef};
use dashmap::DashMap;
use rdf_federation_common::ContractViolation;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

/// Shares equivalent sub-plans between the join trees of different join components.
///
/// A sub-plan is identified by the sequence of join graph nodes that it joins in a left-deep
/// fashion. The interner is only valid for a single [JoinGraph], as node indices differ between
/// graphs. It can be used concurrently by multiple join-order planners.
#[derive(Debug, Default)]
pub struct SubtreeInterner {
    subtrees: DashMap<Box<[usize]>, PlanRef, BuildHasherDefault<FxHasher>>,
}

impl SubtreeInterner {
    pub fn new() -> Self {
        Self {
            subtrees: DashMap::with_hasher(BuildHasherDefault::default()),
        }
    }

    /// Returns the plan that evaluates the single node `node`.
    ///
    /// A node with a single member fragment becomes a fragment leaf. A node that groups multiple
    /// fragments becomes a union of their leaves.
    pub fn leaf(&self, graph: &JoinGraph, node: usize) -> Result<PlanRef, ContractViolation> {
        let graph_node = graph
            .node(node)
            .ok_or(ContractViolation::UnknownNode { node })?;

        Ok(self.canonicalize(&[node], || {
            let leaves = graph_node
                .members()
                .iter()
                .cloned()
                .map(PlanNode::fragment)
                .collect::<Vec<_>>();
            PlanNode::union(leaves).unwrap_or_else(|| {
                PlanNode::empty(graph_node.triples().clone(), PlanningDiagnostics::default())
            })
        }))
    }

    /// Returns the plan registered for `key` or registers the plan created by `build`.
    ///
    /// `build` must not access the interner.
    pub fn canonicalize(&self, key: &[usize], build: impl FnOnce() -> PlanRef) -> PlanRef {
        if let Some(plan) = self.subtrees.get(key) {
            return PlanRef::clone(&plan);
        }
        PlanRef::clone(&self.subtrees.entry(key.into()).or_insert_with(build))
    }

    /// Returns the number of distinct sub-plans.
    pub fn len(&self) -> usize {
        self.subtrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subtrees.is_empty()
    }
}
