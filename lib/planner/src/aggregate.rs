use crate::component::JoinComponent;
use crate::graph::JoinGraph;
use crate::join::JoinOrderPlanner;
use std::fmt;

/// Restructures the join graph and the join components such that identical sub-paths of different
/// components can share their join plans.
///
/// Implementations may replace nodes (e.g., merge a frequently used sub-path into a single node),
/// but the returned components must uphold the invariants of [JoinComponent] with respect to the
/// returned graph and cover the same triples.
pub trait SubPathAggregator: fmt::Debug + Send + Sync {
    fn aggregate(
        &self,
        graph: JoinGraph,
        components: Vec<JoinComponent>,
        planner: &dyn JoinOrderPlanner,
    ) -> (JoinGraph, Vec<JoinComponent>);
}

/// Returns the graph and the components unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityAggregator;

impl SubPathAggregator for IdentityAggregator {
    fn aggregate(
        &self,
        graph: JoinGraph,
        components: Vec<JoinComponent>,
        _planner: &dyn JoinOrderPlanner,
    ) -> (JoinGraph, Vec<JoinComponent>) {
        (graph, components)
    }
}
