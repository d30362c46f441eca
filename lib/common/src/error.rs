use rdf_federation_model::TripleSet;

/// An error raised while planning a federated query.
///
/// Queries that simply cannot be answered by the available fragments are *not* errors. The planner
/// represents them as an empty result carrying diagnostics. An error always indicates a defect in
/// the planner or in one of its collaborators.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PlanningError {
    /// A collaborator handed the planner inputs that violate its contract.
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    #[error("An internal error that likely indicates towards a bug in the planner: {0}")]
    Internal(String),
}

impl PlanningError {
    pub fn internal<T>(cause: impl Into<String>) -> Result<T, Self> {
        Err(PlanningError::Internal(cause.into()))
    }
}

/// A violated precondition between the planner and one of its collaborators.
///
/// These conditions are guaranteed by construction upstream (e.g., by the source selection or the
/// path search). They are never downgraded to an empty result.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ContractViolation {
    /// A fragment claims to answer triples that are not part of the planned query.
    #[error("The fragment {fragment} claims the triples {triples} that are not part of the query")]
    FragmentOutsideQuery { fragment: String, triples: TripleSet },
    /// The query refers to triples that are unknown to the triple universe.
    #[error("The query refers to the triples {triples} that are not part of the triple universe")]
    QueryOutsideUniverse { triples: TripleSet },
    /// A join-order planner received a node set that is not connected in the join graph.
    #[error("The node set {nodes:?} is not join-connected, could not attach {pending:?}")]
    DisconnectedNodeSet {
        nodes: Vec<usize>,
        pending: Vec<usize>,
    },
    /// A join-order planner received an empty node set.
    #[error("Cannot plan the join of an empty node set")]
    EmptyNodeSet,
    /// A node index does not refer to a node of the join graph.
    #[error("The node {node} is not part of the join graph")]
    UnknownNode { node: usize },
}
