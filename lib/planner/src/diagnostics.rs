use crate::graph::NodeSet;
use itertools::Itertools;
use rdf_federation_model::{TripleSet, TripleUniverse, Variable};
use std::collections::BTreeSet;

/// A node combination that covers all triples of the query but cannot be evaluated, as some
/// required inputs are not bound by any other node of the combination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedInputs {
    /// The node combination.
    pub nodes: NodeSet,
    /// The labels of the nodes in `nodes`.
    pub labels: Vec<String>,
    /// The required inputs that are not bound.
    pub missing: BTreeSet<Variable>,
}

/// Explains why the planner could not find a valid join path.
///
/// All collections are bounded samples. They are meant for humans, not for further processing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlanningDiagnostics {
    /// Triples that are not matched by any fragment.
    unreachable: TripleSet,
    /// Triples left uncovered by dead ends of the search.
    near_misses: Vec<TripleSet>,
    /// Full-coverage combinations with unbound required inputs.
    unresolved_inputs: Vec<UnresolvedInputs>,
}

impl PlanningDiagnostics {
    /// Diagnostics for a query where `unreachable` is not matched by any fragment.
    pub fn unreachable(unreachable: TripleSet) -> Self {
        Self {
            unreachable,
            ..Self::default()
        }
    }

    pub fn unreachable_triples(&self) -> &TripleSet {
        &self.unreachable
    }

    pub fn near_misses(&self) -> &[TripleSet] {
        &self.near_misses
    }

    pub fn unresolved_inputs(&self) -> &[UnresolvedInputs] {
        &self.unresolved_inputs
    }

    pub fn is_empty(&self) -> bool {
        self.unreachable.is_empty()
            && self.near_misses.is_empty()
            && self.unresolved_inputs.is_empty()
    }

    /// Adds the samples of `other` to `self`.
    pub fn merge(&mut self, other: &PlanningDiagnostics) {
        self.unreachable.union_with(&other.unreachable);
        for near_miss in &other.near_misses {
            if !self.near_misses.contains(near_miss) {
                self.near_misses.push(near_miss.clone());
            }
        }
        self.unresolved_inputs
            .extend(other.unresolved_inputs.iter().cloned());
    }

    /// Renders a human-readable report, resolving triple ids against `universe`.
    pub fn describe(&self, universe: &TripleUniverse) -> String {
        let render = |set: &TripleSet| {
            set.iter()
                .map(|id| match universe.get(id) {
                    Some(pattern) => format!("{id}: {pattern}"),
                    None => id.to_string(),
                })
                .join("; ")
        };

        if self.is_empty() {
            return "No diagnostics available.".to_owned();
        }

        let mut lines = Vec::new();
        if !self.unreachable.is_empty() {
            lines.push(format!(
                "Not matched by any fragment: {}",
                render(&self.unreachable)
            ));
        }
        for near_miss in &self.near_misses {
            lines.push(format!("Left uncovered: {}", render(near_miss)));
        }
        for unresolved in &self.unresolved_inputs {
            lines.push(format!(
                "Unbound inputs {} of [{}]",
                unresolved.missing.iter().join(", "),
                unresolved.labels.join(", ")
            ));
        }
        lines.join("\n")
    }
}

/// Collects bounded diagnostic samples during a search.
#[derive(Debug)]
pub(crate) struct DiagnosticsCollector {
    diagnostics: PlanningDiagnostics,
    max_samples: usize,
    near_miss_max_uncovered: usize,
}

impl DiagnosticsCollector {
    pub(crate) fn new(max_samples: usize, near_miss_max_uncovered: usize) -> Self {
        Self {
            diagnostics: PlanningDiagnostics::default(),
            max_samples,
            near_miss_max_uncovered,
        }
    }

    pub(crate) fn record_unreachable(&mut self, triples: &TripleSet) {
        self.diagnostics.unreachable.union_with(triples);
    }

    /// Records the triples left uncovered by a dead end, if there are only a few of them.
    pub(crate) fn record_near_miss(&mut self, uncovered: TripleSet) {
        let samples = &mut self.diagnostics.near_misses;
        if uncovered.len() <= self.near_miss_max_uncovered
            && samples.len() < self.max_samples
            && !samples.contains(&uncovered)
        {
            samples.push(uncovered);
        }
    }

    pub(crate) fn record_unresolved(&mut self, unresolved: UnresolvedInputs) {
        let samples = &mut self.diagnostics.unresolved_inputs;
        if samples.len() < self.max_samples {
            samples.push(unresolved);
        }
    }

    pub(crate) fn finish(self) -> PlanningDiagnostics {
        self.diagnostics
    }
}
