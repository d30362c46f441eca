use crate::component::JoinComponent;
use crate::graph::{JoinGraph, NodeSet};
use crate::grouping::GraphNode;
use rustc_hash::FxHashSet;
use std::fmt;
use tracing::debug;

/// Decides whether two join graph nodes are interchangeable alternatives for the same content.
///
/// The predicate is supplied by the source selection, which knows the capabilities of the sources.
/// It must be symmetric.
pub trait AlternativeSources: fmt::Debug + Send + Sync {
    fn are_interchangeable(&self, lhs: &GraphNode, rhs: &GraphNode) -> bool;
}

/// Two nodes are interchangeable if they match the same triples and are answered by the same,
/// non-empty set of sources.
#[derive(Clone, Copy, Debug, Default)]
pub struct SameContentSameSources;

impl AlternativeSources for SameContentSameSources {
    fn are_interchangeable(&self, lhs: &GraphNode, rhs: &GraphNode) -> bool {
        let sources = lhs.sources();
        lhs.triples() == rhs.triples() && !sources.is_empty() && sources == rhs.sources()
    }
}

/// No two distinct nodes are interchangeable.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAlternatives;

impl AlternativeSources for NoAlternatives {
    fn are_interchangeable(&self, _lhs: &GraphNode, _rhs: &GraphNode) -> bool {
        false
    }
}

/// Maps every node to the smallest node it is interchangeable with (possibly itself).
pub fn canonical_nodes(graph: &JoinGraph, alternatives: &dyn AlternativeSources) -> Vec<usize> {
    let nodes = graph.nodes();
    let mut canonical: Vec<usize> = Vec::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        let representative = (0..i)
            .find(|&j| canonical[j] == j && alternatives.are_interchangeable(&nodes[j], node))
            .unwrap_or(i);
        canonical.push(representative);
    }
    canonical
}

/// Removes components that are identical to an earlier component once every node is replaced by
/// its canonical node.
pub fn deduplicate_components(
    graph: &JoinGraph,
    components: Vec<JoinComponent>,
    alternatives: &dyn AlternativeSources,
) -> Vec<JoinComponent> {
    let canonical = canonical_nodes(graph, alternatives);
    let mut seen: FxHashSet<NodeSet> = FxHashSet::default();
    let before = components.len();

    let result = components
        .into_iter()
        .filter(|component| {
            let key = component
                .nodes()
                .iter()
                .map(|node| canonical.get(node).copied().unwrap_or(node))
                .collect::<NodeSet>();
            seen.insert(key)
        })
        .collect::<Vec<_>>();

    if result.len() < before {
        debug!(
            "Removed {} components that only differ in alternative sources",
            before - result.len()
        );
    }
    result
}
