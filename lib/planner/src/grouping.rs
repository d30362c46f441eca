use itertools::Itertools;
use rdf_federation_model::{Fragment, SourceId, TripleSet, Variable};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::trace;

/// The part of a [Fragment] that is relevant for joining it with other fragments.
///
/// Two fragments with the same interface are interchangeable for the join planning. They only
/// differ in the source that answers them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JoinInterface {
    triples: TripleSet,
    result_variables: BTreeSet<Variable>,
    input_variables: BTreeSet<Variable>,
    optional: bool,
}

impl JoinInterface {
    /// Extracts the interface of `fragment`.
    pub fn of(fragment: &Fragment) -> Self {
        Self {
            triples: fragment.triples().clone(),
            result_variables: fragment.result_variables().clone(),
            input_variables: fragment.input_variables().clone(),
            optional: fragment.is_optional(),
        }
    }
}

/// A node of the join graph.
///
/// A node groups one or more fragments with an identical [JoinInterface]. If there is more than one
/// member, the node is evaluated as the union of its members.
#[derive(Clone, Debug)]
pub struct GraphNode {
    interface: JoinInterface,
    /// Result and input variables.
    variables: BTreeSet<Variable>,
    members: Vec<Arc<Fragment>>,
}

impl GraphNode {
    /// Creates a node with a single member.
    pub fn new(fragment: Arc<Fragment>) -> Self {
        Self {
            interface: JoinInterface::of(&fragment),
            variables: fragment.variables(),
            members: vec![fragment],
        }
    }

    pub fn triples(&self) -> &TripleSet {
        &self.interface.triples
    }

    pub fn result_variables(&self) -> &BTreeSet<Variable> {
        &self.interface.result_variables
    }

    pub fn input_variables(&self) -> &BTreeSet<Variable> {
        &self.interface.input_variables
    }

    pub fn variables(&self) -> &BTreeSet<Variable> {
        &self.variables
    }

    pub fn is_optional(&self) -> bool {
        self.interface.optional
    }

    pub fn interface(&self) -> &JoinInterface {
        &self.interface
    }

    pub fn members(&self) -> &[Arc<Fragment>] {
        &self.members
    }

    /// Returns the sources of the members that are backed by a single source.
    pub fn sources(&self) -> BTreeSet<&SourceId> {
        self.members
            .iter()
            .filter_map(|member| member.source())
            .collect()
    }

    /// Returns a label for diagnostics, e.g., `F1|F2` for a node with two members.
    pub fn label(&self) -> String {
        self.members.iter().map(|member| member.name()).join("|")
    }
}

/// Groups `fragments` with an identical [JoinInterface] into a single [GraphNode].
///
/// The nodes are returned in the order of the first appearance of their interface. Fragments that
/// do not match any triple are dropped, as they can never contribute to a join path.
pub fn group_fragments(fragments: &[Arc<Fragment>]) -> Vec<GraphNode> {
    let mut nodes: Vec<GraphNode> = Vec::new();
    let mut index: FxHashMap<JoinInterface, usize> = FxHashMap::default();

    for fragment in fragments {
        if fragment.triples().is_empty() {
            trace!("Dropping fragment {} without matched triples", fragment.name());
            continue;
        }

        let interface = JoinInterface::of(fragment);
        match index.get(&interface) {
            Some(&position) => {
                trace!("Grouping fragment {} into node {position}", fragment.name());
                nodes[position].members.push(Arc::clone(fragment));
            }
            None => {
                index.insert(interface, nodes.len());
                nodes.push(GraphNode::new(Arc::clone(fragment)));
            }
        }
    }

    nodes
}
