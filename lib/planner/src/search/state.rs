use crate::graph::{JoinGraph, NodeSet};
use rdf_federation_model::{TripleSet, Variable};
use std::collections::BTreeSet;

/// The result of trying to extend a [SearchState] with another node.
#[derive(Debug)]
pub(crate) enum Advance {
    /// The node can be added. Contains the extended state.
    Accepted(SearchState),
    /// The extended state contains the given node, which is redundant and can never become a
    /// bridge. No extension of the state is minimal.
    Dominated(usize),
}

/// A partial join path explored by the search.
///
/// A state is a connected set of nodes together with the union of their matched triples.
#[derive(Clone, Debug)]
pub(crate) struct SearchState {
    nodes: NodeSet,
    matched: TripleSet,
    /// For each triple id, the number of included nodes that match the triple.
    occurrences: Vec<u32>,
}

impl SearchState {
    /// Creates a state that only contains `node`. `width` must exceed the largest triple id.
    pub(crate) fn singleton(graph: &JoinGraph, node: usize, width: usize) -> Self {
        let mut state = Self {
            nodes: NodeSet::new(),
            matched: TripleSet::new(),
            occurrences: vec![0; width],
        };
        state.include(graph, node);
        state
    }

    pub(crate) fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub(crate) fn matched(&self) -> &TripleSet {
        &self.matched
    }

    pub(crate) fn into_parts(self) -> (NodeSet, TripleSet) {
        (self.nodes, self.matched)
    }

    /// Tries to add `candidate` to the state.
    ///
    /// The candidate is accepted even if it does not match a new triple, as it may be the only
    /// link between other nodes. The extended state is rejected if it contains a dominated node:
    /// a redundant node (see [Self::redundant_node]) without neighbors outside the state. Such a
    /// node cannot become a bridge by adding further nodes.
    pub(crate) fn try_advance(&self, graph: &JoinGraph, candidate: usize) -> Advance {
        let mut next = self.clone();
        next.include(graph, candidate);

        let dominated = next.nodes.iter().find(|&node| {
            graph
                .neighbors(node)
                .is_some_and(|neighbors| neighbors.is_subset(&next.nodes))
                && next.is_redundant(graph, node)
        });
        match dominated {
            Some(node) => Advance::Dominated(node),
            None => Advance::Accepted(next),
        }
    }

    /// Returns a node whose triples are all matched by other nodes and whose removal keeps the
    /// remaining nodes connected.
    pub(crate) fn redundant_node(&self, graph: &JoinGraph) -> Option<usize> {
        self.nodes.iter().find(|&node| self.is_redundant(graph, node))
    }

    fn is_redundant(&self, graph: &JoinGraph, node: usize) -> bool {
        let Some(triples) = graph.node(node).map(|node| node.triples()) else {
            return false;
        };
        triples
            .iter()
            .all(|t| self.occurrences(t.as_usize()) > 1)
            && graph.is_connected(&self.nodes.without(node))
    }

    /// Returns whether the state matches every triple of `query`.
    pub(crate) fn covers(&self, query: &TripleSet) -> bool {
        query.is_subset(&self.matched)
    }

    /// Returns the required inputs of the included nodes that are not bound by any *other*
    /// included node.
    pub(crate) fn unresolved_inputs(&self, graph: &JoinGraph) -> BTreeSet<Variable> {
        let mut unresolved = BTreeSet::new();
        for node in self.nodes.iter() {
            let Some(inputs) = graph.node(node).map(|node| node.input_variables()) else {
                continue;
            };
            for input in inputs {
                let bound_by_other = self
                    .nodes
                    .iter()
                    .filter(|other| *other != node)
                    .filter_map(|other| graph.node(other))
                    .any(|other| other.result_variables().contains(input));
                if !bound_by_other {
                    unresolved.insert(input.clone());
                }
            }
        }
        unresolved
    }

    fn occurrences(&self, triple: usize) -> u32 {
        self.occurrences.get(triple).copied().unwrap_or_default()
    }

    fn include(&mut self, graph: &JoinGraph, node: usize) {
        let Some(triples) = graph.node(node).map(|node| node.triples()) else {
            return;
        };
        self.nodes.insert(node);
        self.matched.union_with(triples);
        for triple in triples.iter() {
            if let Some(count) = self.occurrences.get_mut(triple.as_usize()) {
                *count += 1;
            }
        }
    }
}
