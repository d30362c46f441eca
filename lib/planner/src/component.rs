use crate::graph::{JoinGraph, NodeSet};
use rdf_federation_model::{Fragment, TripleSet};
use std::sync::Arc;

/// A minimal, connected combination of join graph nodes that covers the entire query.
///
/// Components are created by the path search and never modified afterward. Every component
/// upholds the following invariants with respect to the graph it was found in:
/// - The union of the triples of its nodes equals [Self::triples].
/// - No node is redundant: removing any node either loses a triple or disconnects the remaining
///   nodes.
/// - The nodes are connected in the join graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JoinComponent {
    nodes: NodeSet,
    triples: TripleSet,
}

impl JoinComponent {
    pub fn new(nodes: NodeSet, triples: TripleSet) -> Self {
        Self { nodes, triples }
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub fn triples(&self) -> &TripleSet {
        &self.triples
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all fragments of all nodes of the component.
    pub fn fragments<'graph>(
        &self,
        graph: &'graph JoinGraph,
    ) -> impl Iterator<Item = &'graph Arc<Fragment>> + 'graph {
        let nodes = self.nodes.iter().collect::<Vec<_>>();
        nodes
            .into_iter()
            .filter_map(|node| graph.node(node))
            .flat_map(|node| node.members().iter())
    }

    /// Returns whether the triples of the nodes add up to exactly [Self::triples].
    pub fn is_covering(&self, graph: &JoinGraph) -> bool {
        graph.triples_of(&self.nodes) == self.triples
    }

    /// Returns whether no node can be removed without losing a triple or connectivity.
    pub fn is_minimal(&self, graph: &JoinGraph) -> bool {
        self.nodes.iter().all(|node| {
            let others = self.nodes.without(node);
            let Some(triples) = graph.node(node).map(|node| node.triples()) else {
                return false;
            };
            !triples.is_subset(&graph.triples_of(&others)) || !graph.is_connected(&others)
        })
    }

    pub fn is_connected(&self, graph: &JoinGraph) -> bool {
        graph.is_connected(&self.nodes)
    }
}
