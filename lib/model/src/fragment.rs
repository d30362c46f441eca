use crate::{pattern_variables, TripleSet, TripleUniverse};
use oxrdf::Variable;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Identifies the data source that answers a [Fragment].
///
/// The planner never interprets the token. It is only compared for equality when deciding whether
/// two fragments are interchangeable alternatives for the same content.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(Arc<str>);

impl SourceId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A piece of the query that has already been matched against a candidate source.
///
/// Fragments are produced by the source selection and are immutable inputs of the planner. A
/// fragment answers the triples in [Self::triples] and binds [Self::result_variables]. Before it
/// can be evaluated, all [Self::input_variables] must be bound by another fragment (e.g., for
/// sources that only support bind joins).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    /// A human-readable label used in plans and diagnostics.
    name: String,
    /// The matched triples.
    triples: TripleSet,
    /// The variables bound by the fragment.
    result_variables: BTreeSet<Variable>,
    /// The variables that must be bound before the fragment can be evaluated.
    input_variables: BTreeSet<Variable>,
    /// Whether the fragment stems from an `OPTIONAL` pattern.
    optional: bool,
    /// The source answering the fragment, if the fragment is backed by a single source.
    source: Option<SourceId>,
}

impl Fragment {
    /// Creates a new [Fragment] without any variables.
    pub fn new(name: impl Into<String>, triples: TripleSet) -> Self {
        Self {
            name: name.into(),
            triples,
            result_variables: BTreeSet::new(),
            input_variables: BTreeSet::new(),
            optional: false,
            source: None,
        }
    }

    /// Creates a new [Fragment] that binds every variable occurring in its `triples`.
    pub fn from_universe(
        universe: &TripleUniverse,
        name: impl Into<String>,
        triples: TripleSet,
    ) -> Self {
        let result_variables = triples
            .iter()
            .filter_map(|id| universe.get(id))
            .flat_map(pattern_variables)
            .cloned()
            .collect::<BTreeSet<_>>();
        Self::new(name, triples).with_result_variables(result_variables)
    }

    #[must_use]
    pub fn with_result_variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.result_variables = variables.into_iter().collect();
        self
    }

    /// Marks `variables` as required inputs. Required inputs are no longer result variables.
    #[must_use]
    pub fn with_input_variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.input_variables = variables.into_iter().collect();
        self.result_variables
            .retain(|variable| !self.input_variables.contains(variable));
        self
    }

    #[must_use]
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: SourceId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn triples(&self) -> &TripleSet {
        &self.triples
    }

    pub fn result_variables(&self) -> &BTreeSet<Variable> {
        &self.result_variables
    }

    pub fn input_variables(&self) -> &BTreeSet<Variable> {
        &self.input_variables
    }

    /// Returns all variables of the fragment's interface (results and inputs).
    pub fn variables(&self) -> BTreeSet<Variable> {
        self.result_variables
            .union(&self.input_variables)
            .cloned()
            .collect()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn source(&self) -> Option<&SourceId> {
        self.source.as_ref()
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.triples)?;
        if let Some(source) = &self.source {
            write!(f, " @{source}")?;
        }
        Ok(())
    }
}
