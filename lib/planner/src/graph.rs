use crate::grouping::GraphNode;
use rdf_federation_common::ContractViolation;
use rdf_federation_model::TripleSet;
use roaring::RoaringBitmap;
use std::collections::VecDeque;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// A set of node indices of a [JoinGraph].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeSet(RoaringBitmap);

impl NodeSet {
    pub fn new() -> Self {
        Self(RoaringBitmap::new())
    }

    pub fn singleton(node: usize) -> Self {
        let mut set = Self::new();
        set.insert(node);
        set
    }

    /// Adds `node` to the set. Returns whether the node was newly inserted.
    pub fn insert(&mut self, node: usize) -> bool {
        self.0.insert(node_key(node))
    }

    pub fn remove(&mut self, node: usize) -> bool {
        self.0.remove(node_key(node))
    }

    pub fn contains(&self, node: usize) -> bool {
        u32::try_from(node).is_ok_and(|key| self.0.contains(key))
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "A bitmap over u32 ids never holds more than u32::MAX + 1 elements"
    )]
    pub fn len(&self) -> usize {
        self.0.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the nodes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().map(|key| key as usize)
    }

    /// Returns the smallest node of the set.
    pub fn first(&self) -> Option<usize> {
        self.0.min().map(|key| key as usize)
    }

    pub fn is_subset(&self, other: &NodeSet) -> bool {
        self.0.is_subset(&other.0)
    }

    #[must_use]
    pub fn union(&self, other: &NodeSet) -> NodeSet {
        Self(&self.0 | &other.0)
    }

    #[must_use]
    pub fn difference(&self, other: &NodeSet) -> NodeSet {
        Self(&self.0 - &other.0)
    }

    pub fn union_with(&mut self, other: &NodeSet) {
        self.0 |= &other.0;
    }

    #[must_use]
    pub fn with(&self, node: usize) -> NodeSet {
        let mut result = self.clone();
        result.insert(node);
        result
    }

    #[must_use]
    pub fn without(&self, node: usize) -> NodeSet {
        let mut result = self.clone();
        result.remove(node);
        result
    }
}

impl Eq for NodeSet {}

impl Hash for NodeSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for key in &self.0 {
            key.hash(state);
        }
    }
}

impl FromIterator<usize> for NodeSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self(iter.into_iter().map(node_key).collect())
    }
}

impl Display for NodeSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, node) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{node}")?;
        }
        f.write_str("]")
    }
}

#[allow(clippy::expect_used, reason = "Join graphs never have more than u32::MAX nodes")]
fn node_key(node: usize) -> u32 {
    u32::try_from(node).expect("Unrealistically large join graph (> u32)")
}

/// Decides whether two nodes of a join graph can be joined.
///
/// The predicate must be symmetric.
pub trait JoinValidity: fmt::Debug + Send + Sync {
    fn is_joinable(&self, lhs: &GraphNode, rhs: &GraphNode) -> bool;
}

/// Two nodes are joinable if they share at least one variable and their required inputs do not
/// depend on each other.
///
/// A mutual dependency (`lhs` requires a variable bound by `rhs` and vice versa) can never be
/// evaluated as a bind join in either direction.
#[derive(Clone, Copy, Debug, Default)]
pub struct SharedVariableValidity;

impl JoinValidity for SharedVariableValidity {
    fn is_joinable(&self, lhs: &GraphNode, rhs: &GraphNode) -> bool {
        if lhs.variables().is_disjoint(rhs.variables()) {
            return false;
        }

        let lhs_needs_rhs = !lhs.input_variables().is_disjoint(rhs.result_variables());
        let rhs_needs_lhs = !rhs.input_variables().is_disjoint(lhs.result_variables());
        !(lhs_needs_rhs && rhs_needs_lhs)
    }
}

/// The nodes of a planning problem together with the joinability relation.
///
/// Nodes are addressed by their index. The adjacency is stored as one [NodeSet] per node.
#[derive(Clone, Debug)]
pub struct JoinGraph {
    nodes: Vec<GraphNode>,
    adjacency: Vec<NodeSet>,
}

impl JoinGraph {
    /// Builds the graph by evaluating `validity` for every pair of nodes.
    pub fn build(nodes: Vec<GraphNode>, validity: &dyn JoinValidity) -> Self {
        let mut adjacency = vec![NodeSet::new(); nodes.len()];
        for (i, lhs) in nodes.iter().enumerate() {
            for (j, rhs) in nodes.iter().enumerate().skip(i + 1) {
                if validity.is_joinable(lhs, rhs) {
                    adjacency[i].insert(j);
                    adjacency[j].insert(i);
                }
            }
        }
        Self { nodes, adjacency }
    }

    /// Creates a graph from explicitly given (undirected) `edges`.
    pub fn with_edges(
        nodes: Vec<GraphNode>,
        edges: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, ContractViolation> {
        let mut adjacency = vec![NodeSet::new(); nodes.len()];
        for (lhs, rhs) in edges {
            for node in [lhs, rhs] {
                if node >= nodes.len() {
                    return Err(ContractViolation::UnknownNode { node });
                }
            }
            if lhs != rhs {
                adjacency[lhs].insert(rhs);
                adjacency[rhs].insert(lhs);
            }
        }
        Ok(Self { nodes, adjacency })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn node(&self, node: usize) -> Option<&GraphNode> {
        self.nodes.get(node)
    }

    pub fn neighbors(&self, node: usize) -> Option<&NodeSet> {
        self.adjacency.get(node)
    }

    /// Calls `visit` for every node that is joinable with `node`, in ascending order.
    pub fn for_each_neighbor(&self, node: usize, mut visit: impl FnMut(usize)) {
        if let Some(neighbors) = self.adjacency.get(node) {
            neighbors.iter().for_each(&mut visit);
        }
    }

    pub fn is_joinable(&self, lhs: usize, rhs: usize) -> bool {
        self.adjacency
            .get(lhs)
            .is_some_and(|neighbors| neighbors.contains(rhs))
    }

    /// Returns the nodes that are joinable with any node of `nodes` but are not part of `nodes`.
    pub fn frontier(&self, nodes: &NodeSet) -> NodeSet {
        let mut result = NodeSet::new();
        for node in nodes.iter() {
            if let Some(neighbors) = self.adjacency.get(node) {
                result.union_with(neighbors);
            }
        }
        result.difference(nodes)
    }

    /// Returns whether the nodes in `nodes` are connected using only edges within `nodes`.
    ///
    /// The empty set is considered connected.
    pub fn is_connected(&self, nodes: &NodeSet) -> bool {
        let Some(start) = nodes.first() else {
            return true;
        };

        let mut reached = NodeSet::singleton(start);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            self.for_each_neighbor(node, |neighbor| {
                if nodes.contains(neighbor) && reached.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            });
        }
        reached.len() == nodes.len()
    }

    /// Returns the union of the matched triples of `nodes`.
    pub fn triples_of(&self, nodes: &NodeSet) -> TripleSet {
        let mut result = TripleSet::new();
        for node in nodes.iter().filter_map(|node| self.nodes.get(node)) {
            result.union_with(node.triples());
        }
        result
    }
}
