//! Join-path planning for federated SPARQL basic graph patterns.
//!
//! The source selection matches pieces of a query against the available sources and produces
//! [Fragment](rdf_federation_model::Fragment)s. The [FederatedJoinPlanner] combines these fragments
//! into a plan that answers the entire query:
//!
//! 1. Fragments with the same join interface are grouped into the nodes of a [JoinGraph].
//! 2. The [PathSearch] enumerates the minimal, connected node sets that cover the query.
//! 3. Components that only differ in interchangeable sources are removed.
//! 4. A [JoinOrderPlanner] turns each component into a join tree and the trees are unioned.
//!
//! If the query cannot be answered, the plan is an [EmptyResult](join::EmptyResult) that carries
//! [PlanningDiagnostics].

mod aggregate;
mod component;
mod config;
mod decompose;
mod dedup;
mod diagnostics;
mod graph;
mod grouping;
pub mod join;
mod planner;
mod search;

pub use aggregate::{IdentityAggregator, SubPathAggregator};
pub use component::JoinComponent;
pub use config::PlannerConfig;
pub use decompose::{QueryDecomposer, VariableConnectedComponents};
pub use dedup::{
    canonical_nodes, deduplicate_components, AlternativeSources, NoAlternatives,
    SameContentSameSources,
};
pub use diagnostics::{PlanningDiagnostics, UnresolvedInputs};
pub use graph::{JoinGraph, JoinValidity, NodeSet, SharedVariableValidity};
pub use grouping::{group_fragments, GraphNode, JoinInterface};
pub use planner::{FederatedJoinPlanner, PlanningOutcome};
pub use search::{PathSearch, SearchOutcome, SearchStatistics};
