use crate::{TripleId, TripleSet};
use oxrdf::Variable;
use rustc_hash::FxHashMap;
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
use std::collections::BTreeSet;

/// Assigns stable [TripleId]s to the triple patterns of a query.
///
/// All bit-vectors handed to the planner (matched triples of fragments, the query itself) refer to
/// the same universe. Interning a pattern twice returns the identifier of the first occurrence.
#[derive(Clone, Debug, Default)]
pub struct TripleUniverse {
    /// The interned patterns. The position of a pattern is its id.
    patterns: Vec<TriplePattern>,
    /// Maps patterns to their id.
    ids: FxHashMap<TriplePattern, TripleId>,
}

impl TripleUniverse {
    /// Creates an empty [TripleUniverse].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [TripleUniverse] by interning all `patterns` in order.
    pub fn from_patterns(patterns: impl IntoIterator<Item = TriplePattern>) -> Self {
        let mut universe = Self::new();
        for pattern in patterns {
            universe.intern(pattern);
        }
        universe
    }

    /// Returns the id of `pattern`, allocating a new one if the pattern is not yet known.
    #[allow(clippy::expect_used, reason = "Queries never have more than u32::MAX patterns")]
    pub fn intern(&mut self, pattern: TriplePattern) -> TripleId {
        if let Some(id) = self.ids.get(&pattern) {
            return *id;
        }

        let id = TripleId::new(
            u32::try_from(self.patterns.len()).expect("Unrealistically large query (> u32)"),
        );
        self.ids.insert(pattern.clone(), id);
        self.patterns.push(pattern);
        id
    }

    /// Returns the id of an already interned `pattern`.
    pub fn id_of(&self, pattern: &TriplePattern) -> Option<TripleId> {
        self.ids.get(pattern).copied()
    }

    pub fn get(&self, id: TripleId) -> Option<&TriplePattern> {
        self.patterns.get(id.as_usize())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterates over all interned patterns together with their id.
    pub fn iter(&self) -> impl Iterator<Item = (TripleId, &TriplePattern)> {
        self.ids_in_order().zip(self.patterns.iter())
    }

    /// Returns the set containing every interned triple.
    pub fn full_set(&self) -> TripleSet {
        self.ids_in_order().collect()
    }

    /// Returns whether every id of `set` refers to an interned pattern.
    pub fn contains_all(&self, set: &TripleSet) -> bool {
        set.max()
            .map_or(true, |max| max.as_usize() < self.patterns.len())
    }

    /// Returns the variables that occur in the pattern `id`.
    pub fn variables(&self, id: TripleId) -> BTreeSet<Variable> {
        self.get(id)
            .map(|pattern| pattern_variables(pattern).cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the variables that occur in any pattern of `set`.
    pub fn variables_of(&self, set: &TripleSet) -> BTreeSet<Variable> {
        set.iter().flat_map(|id| self.variables(id)).collect()
    }

    fn ids_in_order(&self) -> impl Iterator<Item = TripleId> {
        (0..self.patterns.len()).filter_map(|i| u32::try_from(i).ok().map(TripleId::new))
    }
}

/// Iterates over the variables of a single triple pattern in subject, predicate, object order.
///
/// Blank nodes are not returned. Nested triple patterns are not descended into.
pub fn pattern_variables(pattern: &TriplePattern) -> impl Iterator<Item = &Variable> {
    let subject = match &pattern.subject {
        TermPattern::Variable(variable) => Some(variable),
        _ => None,
    };
    let predicate = match &pattern.predicate {
        NamedNodePattern::Variable(variable) => Some(variable),
        NamedNodePattern::NamedNode(_) => None,
    };
    let object = match &pattern.object {
        TermPattern::Variable(variable) => Some(variable),
        _ => None,
    };
    subject.into_iter().chain(predicate).chain(object)
}
