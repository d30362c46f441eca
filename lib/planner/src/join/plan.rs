use crate::diagnostics::PlanningDiagnostics;
use rdf_federation_model::{Fragment, TripleSet, Variable};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// A shared reference to a node of a join plan.
///
/// Identical sub-plans of different join components point to the same allocation.
pub type PlanRef = Arc<PlanNode>;

static NO_VARIABLES: BTreeSet<Variable> = BTreeSet::new();

/// A node of a federated join plan.
///
/// Plans are built bottom-up and never modified. All derived properties (matched triples,
/// variables, optionality) are computed when a node is created.
#[derive(Debug, PartialEq, Eq)]
pub enum PlanNode {
    /// Evaluates a single fragment at its source.
    Fragment(FragmentNode),
    /// Joins two sub-plans.
    Join(JoinNode),
    /// Evaluates alternative sub-plans and combines their solutions.
    Union(UnionNode),
    /// The query cannot be answered by the available fragments.
    Empty(EmptyResult),
}

#[derive(Debug, PartialEq, Eq)]
pub struct FragmentNode {
    fragment: Arc<Fragment>,
    variables: BTreeSet<Variable>,
}

impl FragmentNode {
    pub fn fragment(&self) -> &Arc<Fragment> {
        &self.fragment
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct JoinNode {
    lhs: PlanRef,
    rhs: PlanRef,
    triples: TripleSet,
    variables: BTreeSet<Variable>,
    /// Both inputs stem from optional patterns, so the join itself is optional.
    implicit_optional: bool,
}

impl JoinNode {
    pub fn lhs(&self) -> &PlanRef {
        &self.lhs
    }

    pub fn rhs(&self) -> &PlanRef {
        &self.rhs
    }

    pub fn is_implicit_optional(&self) -> bool {
        self.implicit_optional
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnionNode {
    children: Vec<PlanRef>,
    triples: TripleSet,
    variables: BTreeSet<Variable>,
}

impl UnionNode {
    pub fn children(&self) -> &[PlanRef] {
        &self.children
    }
}

/// Marks a query for which no valid join path exists.
#[derive(Debug, PartialEq, Eq)]
pub struct EmptyResult {
    /// The triples of the original query.
    query: TripleSet,
    diagnostics: PlanningDiagnostics,
}

impl EmptyResult {
    pub fn query(&self) -> &TripleSet {
        &self.query
    }

    pub fn diagnostics(&self) -> &PlanningDiagnostics {
        &self.diagnostics
    }
}

impl PlanNode {
    pub fn fragment(fragment: Arc<Fragment>) -> PlanRef {
        let variables = fragment.variables();
        Arc::new(PlanNode::Fragment(FragmentNode {
            fragment,
            variables,
        }))
    }

    pub fn join(lhs: PlanRef, rhs: PlanRef) -> PlanRef {
        let triples = lhs.triples().union(rhs.triples());
        let variables = lhs.variables().union(rhs.variables()).cloned().collect();
        let implicit_optional = lhs.is_optional() && rhs.is_optional();
        Arc::new(PlanNode::Join(JoinNode {
            lhs,
            rhs,
            triples,
            variables,
            implicit_optional,
        }))
    }

    /// Creates a union of `children`. A single child is returned as is.
    ///
    /// Returns [None] if there are no children.
    pub fn union(mut children: Vec<PlanRef>) -> Option<PlanRef> {
        match children.len() {
            0 => None,
            1 => children.pop(),
            _ => {
                let mut triples = TripleSet::new();
                let mut variables = BTreeSet::new();
                for child in &children {
                    triples.union_with(child.triples());
                    variables.extend(child.variables().iter().cloned());
                }
                Some(Arc::new(PlanNode::Union(UnionNode {
                    children,
                    triples,
                    variables,
                })))
            }
        }
    }

    pub fn empty(query: TripleSet, diagnostics: PlanningDiagnostics) -> PlanRef {
        Arc::new(PlanNode::Empty(EmptyResult { query, diagnostics }))
    }

    /// Returns the triples matched by this plan. For an [EmptyResult], these are the triples of
    /// the query that could not be answered.
    pub fn triples(&self) -> &TripleSet {
        match self {
            PlanNode::Fragment(node) => node.fragment.triples(),
            PlanNode::Join(node) => &node.triples,
            PlanNode::Union(node) => &node.triples,
            PlanNode::Empty(node) => &node.query,
        }
    }

    /// Returns the variables bound or required by this plan.
    pub fn variables(&self) -> &BTreeSet<Variable> {
        match self {
            PlanNode::Fragment(node) => &node.variables,
            PlanNode::Join(node) => &node.variables,
            PlanNode::Union(node) => &node.variables,
            PlanNode::Empty(_) => &NO_VARIABLES,
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            PlanNode::Fragment(node) => node.fragment.is_optional(),
            PlanNode::Join(node) => node.implicit_optional,
            PlanNode::Union(node) => node.children.iter().all(|child| child.is_optional()),
            PlanNode::Empty(_) => false,
        }
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, PlanNode::Empty(_))
    }

    pub fn as_empty(&self) -> Option<&EmptyResult> {
        match self {
            PlanNode::Empty(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the direct children of this node.
    pub fn children(&self) -> Vec<&PlanRef> {
        match self {
            PlanNode::Fragment(_) | PlanNode::Empty(_) => Vec::new(),
            PlanNode::Join(node) => vec![&node.lhs, &node.rhs],
            PlanNode::Union(node) => node.children.iter().collect(),
        }
    }

    /// Counts the fragment leaves of the plan. Shared sub-plans are counted once per occurrence.
    pub fn leaf_count(&self) -> usize {
        match self {
            PlanNode::Fragment(_) => 1,
            _ => self.children().iter().map(|child| child.leaf_count()).sum(),
        }
    }

    /// Counts the join nodes of the plan. Shared sub-plans are counted once per occurrence.
    pub fn join_count(&self) -> usize {
        let own = usize::from(matches!(self, PlanNode::Join(_)));
        own + self
            .children()
            .iter()
            .map(|child| child.join_count())
            .sum::<usize>()
    }

    fn fmt_indented(&self, f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}", "", indent = depth * 2)?;
        match self {
            PlanNode::Fragment(node) => {
                write!(f, "Fragment: {}", node.fragment)?;
                if node.fragment.is_optional() {
                    f.write_str(" optional")?;
                }
            }
            PlanNode::Join(node) if node.implicit_optional => {
                f.write_str("Join (implicit optional)")?;
            }
            PlanNode::Join(_) => f.write_str("Join")?,
            PlanNode::Union(_) => f.write_str("Union")?,
            PlanNode::Empty(node) => write!(f, "Empty: {}", node.query)?,
        }
        for child in self.children() {
            f.write_str("\n")?;
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl Display for PlanNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
