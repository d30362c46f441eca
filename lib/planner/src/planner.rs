use crate::aggregate::{IdentityAggregator, SubPathAggregator};
use crate::config::PlannerConfig;
use crate::decompose::{merge_spanned_parts, QueryDecomposer, VariableConnectedComponents};
use crate::dedup::{deduplicate_components, AlternativeSources, SameContentSameSources};
use crate::diagnostics::PlanningDiagnostics;
use crate::graph::{JoinGraph, JoinValidity, NodeSet, SharedVariableValidity};
use crate::grouping::group_fragments;
use crate::join::{ArbitraryJoinOrder, JoinOrderPlanner, PlanNode, PlanRef, SubtreeInterner};
use crate::search::PathSearch;
use rayon::prelude::*;
use rdf_federation_common::{ContractViolation, PlanningError, PlanningResult};
use rdf_federation_model::{Fragment, TripleSet, TripleUniverse};
use std::sync::Arc;
use tracing::{debug, warn};

/// The result of planning a query with the [FederatedJoinPlanner].
#[derive(Clone, Debug)]
pub struct PlanningOutcome {
    plan: PlanRef,
    component_count: usize,
}

impl PlanningOutcome {
    /// The root of the plan.
    pub fn plan(&self) -> &PlanRef {
        &self.plan
    }

    pub fn into_plan(self) -> PlanRef {
        self.plan
    }

    /// Returns whether the query cannot be answered at all.
    pub fn is_empty(&self) -> bool {
        self.plan.is_empty_result()
    }

    /// Returns the diagnostics if the query cannot be answered at all.
    pub fn diagnostics(&self) -> Option<&PlanningDiagnostics> {
        self.plan.as_empty().map(|empty| empty.diagnostics())
    }

    /// The number of join components that ended up in the plan, summed over all independently
    /// planned parts of the query.
    pub fn component_count(&self) -> usize {
        self.component_count
    }
}

/// Plans the joins of a federated basic graph pattern.
///
/// Given the fragments that the source selection matched against the query, the planner finds
/// every minimal combination of fragments that covers the query, turns each combination into a
/// join tree, and unions the alternatives. If no such combination exists, the plan is an
/// [EmptyResult](crate::join::EmptyResult) that explains why.
///
/// All policies (joinability, interchangeable sources, sub-path aggregation, join ordering, and
/// query decomposition) can be replaced using the `with_*` methods.
#[derive(Clone, Debug)]
pub struct FederatedJoinPlanner {
    config: PlannerConfig,
    validity: Arc<dyn JoinValidity>,
    alternatives: Arc<dyn AlternativeSources>,
    aggregator: Arc<dyn SubPathAggregator>,
    join_order: Arc<dyn JoinOrderPlanner>,
    decomposer: Arc<dyn QueryDecomposer>,
}

impl Default for FederatedJoinPlanner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl FederatedJoinPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            validity: Arc::new(SharedVariableValidity),
            alternatives: Arc::new(SameContentSameSources),
            aggregator: Arc::new(IdentityAggregator),
            join_order: Arc::new(ArbitraryJoinOrder),
            decomposer: Arc::new(VariableConnectedComponents),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    #[must_use]
    pub fn with_config(self, config: PlannerConfig) -> Self {
        Self { config, ..self }
    }

    #[must_use]
    pub fn with_join_validity(self, validity: Arc<dyn JoinValidity>) -> Self {
        Self { validity, ..self }
    }

    #[must_use]
    pub fn with_alternative_sources(self, alternatives: Arc<dyn AlternativeSources>) -> Self {
        Self {
            alternatives,
            ..self
        }
    }

    #[must_use]
    pub fn with_sub_path_aggregator(self, aggregator: Arc<dyn SubPathAggregator>) -> Self {
        Self { aggregator, ..self }
    }

    #[must_use]
    pub fn with_join_order_planner(self, join_order: Arc<dyn JoinOrderPlanner>) -> Self {
        Self { join_order, ..self }
    }

    #[must_use]
    pub fn with_query_decomposer(self, decomposer: Arc<dyn QueryDecomposer>) -> Self {
        Self { decomposer, ..self }
    }

    /// Plans the joins of `query` using `fragments`.
    ///
    /// Returns an error if `query` is not part of `universe` or if a fragment matches triples
    /// outside of `query`. A query that cannot be answered is not an error, it results in an
    /// empty plan.
    pub fn plan(
        &self,
        universe: &TripleUniverse,
        query: &TripleSet,
        fragments: &[Arc<Fragment>],
    ) -> PlanningResult<PlanningOutcome> {
        if !universe.contains_all(query) {
            return Err(ContractViolation::QueryOutsideUniverse {
                triples: query.difference(&universe.full_set()),
            }
            .into());
        }
        for fragment in fragments {
            if !fragment.triples().is_subset(query) {
                return Err(ContractViolation::FragmentOutsideQuery {
                    fragment: fragment.name().to_owned(),
                    triples: fragment.triples().difference(query),
                }
                .into());
            }
        }

        if query.is_empty() {
            debug!("Planning an empty query");
            return Ok(PlanningOutcome {
                plan: PlanNode::empty(TripleSet::new(), PlanningDiagnostics::default()),
                component_count: 0,
            });
        }

        let parts = merge_spanned_parts(self.decomposer.decompose(universe, query), fragments);
        if parts.len() > 1 {
            debug!("The query {query} consists of {} independent parts", parts.len());
            return self.plan_parts(universe, query, fragments, &parts);
        }

        self.plan_connected(universe, query, fragments)
    }

    /// Plans each part on its own and combines the parts with cartesian joins.
    ///
    /// Every fragment must be contained in a single part.
    fn plan_parts(
        &self,
        universe: &TripleUniverse,
        query: &TripleSet,
        fragments: &[Arc<Fragment>],
        parts: &[TripleSet],
    ) -> PlanningResult<PlanningOutcome> {
        let mut plans = Vec::with_capacity(parts.len());
        let mut component_count = 0;
        for part in parts {
            let part_fragments = fragments
                .iter()
                .filter(|fragment| {
                    !fragment.triples().is_empty() && fragment.triples().is_subset(part)
                })
                .cloned()
                .collect::<Vec<_>>();
            let outcome = self.plan_connected(universe, part, &part_fragments)?;
            component_count += outcome.component_count;
            plans.push(outcome.plan);
        }

        if plans.iter().all(|plan| plan.is_empty_result()) {
            let mut diagnostics = PlanningDiagnostics::default();
            for empty in plans.iter().filter_map(|plan| plan.as_empty()) {
                diagnostics.merge(empty.diagnostics());
            }
            warn!(
                "None of the independent parts of {query} can be answered:\n{}",
                diagnostics.describe(universe)
            );
            return Ok(PlanningOutcome {
                plan: PlanNode::empty(query.clone(), diagnostics),
                component_count: 0,
            });
        }

        let mut plans = plans.into_iter();
        let Some(first) = plans.next() else {
            return PlanningError::internal("A decomposed query must have at least one part");
        };
        let plan = plans.fold(first, PlanNode::join);
        Ok(PlanningOutcome {
            plan,
            component_count,
        })
    }

    /// Plans a query that is not split any further.
    fn plan_connected(
        &self,
        universe: &TripleUniverse,
        query: &TripleSet,
        fragments: &[Arc<Fragment>],
    ) -> PlanningResult<PlanningOutcome> {
        if fragments.is_empty() {
            warn!("No fragment matches any of the triples {query}");
            return Ok(PlanningOutcome {
                plan: PlanNode::empty(
                    query.clone(),
                    PlanningDiagnostics::unreachable(query.clone()),
                ),
                component_count: 0,
            });
        }

        let nodes = group_fragments(fragments);
        debug!(
            "Grouped {} fragments into {} join graph nodes",
            fragments.len(),
            nodes.len()
        );
        let graph = JoinGraph::build(nodes, self.validity.as_ref());

        let outcome = PathSearch::new(&graph, query, &self.config).run();
        if outcome.components.is_empty() {
            warn!(
                "Could not find a valid join path for {query}:\n{}",
                outcome.diagnostics.describe(universe)
            );
            return Ok(PlanningOutcome {
                plan: PlanNode::empty(query.clone(), outcome.diagnostics),
                component_count: 0,
            });
        }

        let components =
            deduplicate_components(&graph, outcome.components, self.alternatives.as_ref());
        let (graph, components) =
            self.aggregator
                .aggregate(graph, components, self.join_order.as_ref());
        if components.is_empty() {
            return PlanningError::internal("The sub-path aggregator removed all join components");
        }
        if let Some(component) = components.iter().find(|c| c.triples() != query) {
            return PlanningError::internal(format!(
                "The join component {} matches {} instead of {query}",
                component.nodes(),
                component.triples()
            ));
        }

        let subtrees = SubtreeInterner::new();
        let plan_component = |nodes: &NodeSet| self.join_order.plan(&graph, nodes, &subtrees);
        let plans = if components.len() > self.config.parallel_threshold {
            debug!("Planning {} join components in parallel", components.len());
            components
                .par_iter()
                .map(|component| plan_component(component.nodes()))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            components
                .iter()
                .map(|component| plan_component(component.nodes()))
                .collect::<Result<Vec<_>, _>>()?
        };
        debug!(
            "Planned {} join components with {} distinct sub-plans",
            plans.len(),
            subtrees.len()
        );

        let Some(plan) = PlanNode::union(plans) else {
            return PlanningError::internal("No join tree was planned");
        };
        Ok(PlanningOutcome {
            plan,
            component_count: components.len(),
        })
    }
}
