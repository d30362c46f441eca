mod state;
mod visited;

use crate::component::JoinComponent;
use crate::config::PlannerConfig;
use crate::diagnostics::{DiagnosticsCollector, PlanningDiagnostics, UnresolvedInputs};
use crate::graph::{JoinGraph, NodeSet};
use rdf_federation_model::TripleSet;
use rustc_hash::FxHashSet;
use state::{Advance, SearchState};
use std::collections::VecDeque;
use itertools::Itertools;
use tracing::{debug, trace};
use visited::VisitedStates;

/// Counters describing the work done by a single [PathSearch].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// The number of states taken from the queue.
    pub expanded: usize,
    /// Transitions rejected because the extended node set contains a redundant node that can
    /// never become a bridge.
    pub rejected_dominated: usize,
    /// Node sets that cover the query but contain a redundant node.
    pub rejected_redundant: usize,
    /// Transitions that reached an already enqueued node set.
    pub memo_hits: usize,
    /// Node sets forgotten by the bounded memo.
    pub memo_evictions: usize,
}

/// The result of a [PathSearch].
#[derive(Debug)]
pub struct SearchOutcome {
    /// The valid join components in the order they were found.
    pub components: Vec<JoinComponent>,
    /// Explains missing components. Only populated with samples of failed attempts.
    pub diagnostics: PlanningDiagnostics,
    /// Counters describing the work done by the search.
    pub statistics: SearchStatistics,
}

/// Enumerates the minimal, connected node combinations of a [JoinGraph] that cover a query.
///
/// The search is a breadth-first search over [SearchState]s. It starts with one state per node and
/// extends states with nodes from their frontier in the join graph, so every connected node set is
/// reachable. A node set that covers the query is never extended, as no proper superset of a
/// connected covering set is minimal. Extensions that contain a redundant node without neighbors
/// outside the node set are pruned, as that node stays redundant in every further extension.
///
/// A state that covers the query is accepted if it has no redundant node and every required input
/// of its nodes is bound by another node of the state. Unbound inputs are recorded in the
/// diagnostics.
///
/// The search is deterministic: states are expanded in FIFO order and candidates are tried in
/// ascending node order.
#[derive(Debug)]
pub struct PathSearch<'search> {
    graph: &'search JoinGraph,
    query: &'search TripleSet,
    config: &'search PlannerConfig,
}

impl<'search> PathSearch<'search> {
    pub fn new(
        graph: &'search JoinGraph,
        query: &'search TripleSet,
        config: &'search PlannerConfig,
    ) -> Self {
        Self {
            graph,
            query,
            config,
        }
    }

    /// Runs the search to completion.
    pub fn run(self) -> SearchOutcome {
        let mut statistics = SearchStatistics::default();
        let mut diagnostics = DiagnosticsCollector::new(
            self.config.max_diagnostic_samples,
            self.config.near_miss_max_uncovered,
        );
        let mut components = Vec::new();

        let reachable = self.graph.triples_of(&(0..self.graph.len()).collect());
        let unreachable = self.query.difference(&reachable);
        if !unreachable.is_empty() {
            debug!("The triples {unreachable} are not matched by any fragment");
            diagnostics.record_unreachable(&unreachable);
            return SearchOutcome {
                components,
                diagnostics: diagnostics.finish(),
                statistics,
            };
        }

        let width = self.query.max().map_or(0, |max| max.as_usize() + 1);
        let mut visited = VisitedStates::new(self.config.memo_capacity);
        let mut accepted: FxHashSet<NodeSet> = FxHashSet::default();
        let mut queue = VecDeque::new();

        for node in 0..self.graph.len() {
            let state = SearchState::singleton(self.graph, node, width);
            if !state.matched().is_empty() && visited.insert(state.nodes()) {
                queue.push_back(state);
            }
        }

        while let Some(state) = queue.pop_front() {
            statistics.expanded += 1;

            if state.covers(self.query) {
                self.finish_state(
                    state,
                    &mut accepted,
                    &mut components,
                    &mut diagnostics,
                    &mut statistics,
                );
                continue;
            }

            let mut advanced = false;
            for candidate in self.graph.frontier(state.nodes()).iter() {
                match state.try_advance(self.graph, candidate) {
                    Advance::Accepted(next) => {
                        advanced = true;
                        if visited.insert(next.nodes()) {
                            queue.push_back(next);
                        } else {
                            statistics.memo_hits += 1;
                        }
                    }
                    Advance::Dominated(node) => {
                        trace!(
                            "Adding {candidate} to {} leaves {node} redundant",
                            state.nodes()
                        );
                        statistics.rejected_dominated += 1;
                    }
                }
            }

            if !advanced {
                let uncovered = self.query.difference(state.matched());
                trace!("Dead end {} leaves {uncovered} uncovered", state.nodes());
                diagnostics.record_near_miss(uncovered);
            }
        }

        statistics.memo_evictions = visited.evictions();
        debug!(
            "Path search found {} components: {statistics:?}",
            components.len()
        );

        SearchOutcome {
            components,
            diagnostics: diagnostics.finish(),
            statistics,
        }
    }

    /// Accepts a state that covers the query or records why it cannot be evaluated.
    fn finish_state(
        &self,
        state: SearchState,
        accepted: &mut FxHashSet<NodeSet>,
        components: &mut Vec<JoinComponent>,
        diagnostics: &mut DiagnosticsCollector,
        statistics: &mut SearchStatistics,
    ) {
        if let Some(node) = state.redundant_node(self.graph) {
            trace!("The node {node} of {} is redundant", state.nodes());
            statistics.rejected_redundant += 1;
            return;
        }

        let missing = state.unresolved_inputs(self.graph);
        if !missing.is_empty() {
            debug!(
                "The node set {} covers the query but leaves {} unbound",
                state.nodes(),
                missing.iter().join(", ")
            );
            let labels = state
                .nodes()
                .iter()
                .filter_map(|node| self.graph.node(node))
                .map(|node| node.label())
                .collect();
            diagnostics.record_unresolved(UnresolvedInputs {
                nodes: state.nodes().clone(),
                labels,
                missing,
            });
            return;
        }

        // The memo may forget a node set, so the same combination can be reached twice.
        if accepted.insert(state.nodes().clone()) {
            let (nodes, triples) = state.into_parts();
            components.push(JoinComponent::new(nodes, triples));
        }
    }
}
