mod fragment;
mod triple_set;
mod universe;

pub use fragment::{Fragment, SourceId};
pub use triple_set::{TripleId, TripleSet};
pub use universe::{pattern_variables, TripleUniverse};

// Re-export some oxrdf and spargebra types.
pub use oxrdf::{BlankNode, Literal, NamedNode, Variable, VariableRef};
pub use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
