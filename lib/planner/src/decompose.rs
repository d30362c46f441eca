use rdf_federation_model::{pattern_variables, Fragment, TripleSet, TripleUniverse, Variable};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Splits a query into parts that can be planned independently.
pub trait QueryDecomposer: fmt::Debug + Send + Sync {
    /// Returns disjoint parts whose union is `query`. A connected query yields a single part.
    fn decompose(&self, universe: &TripleUniverse, query: &TripleSet) -> Vec<TripleSet>;
}

/// Splits the query into the connected components of the "shares a variable" relation between
/// triple patterns.
///
/// The parts are ordered by their smallest triple id.
#[derive(Clone, Copy, Debug, Default)]
pub struct VariableConnectedComponents;

impl QueryDecomposer for VariableConnectedComponents {
    fn decompose(&self, universe: &TripleUniverse, query: &TripleSet) -> Vec<TripleSet> {
        let triples = query.iter().collect::<Vec<_>>();
        let mut parents = (0..triples.len()).collect::<Vec<_>>();
        let mut owners: FxHashMap<&Variable, usize> = FxHashMap::default();

        for (position, triple) in triples.iter().enumerate() {
            let Some(pattern) = universe.get(*triple) else {
                continue;
            };
            for variable in pattern_variables(pattern) {
                match owners.get(variable) {
                    Some(&owner) => merge(&mut parents, owner, position),
                    None => {
                        owners.insert(variable, position);
                    }
                }
            }
        }

        let mut parts: Vec<(usize, TripleSet)> = Vec::new();
        for (position, triple) in triples.iter().enumerate() {
            let root = find(&mut parents, position);
            match parts.iter_mut().find(|(part_root, _)| *part_root == root) {
                Some((_, part)) => {
                    part.insert(*triple);
                }
                None => parts.push((root, [*triple].into_iter().collect())),
            }
        }
        parts.into_iter().map(|(_, part)| part).collect()
    }
}

/// Merges all parts that share a triple with the same fragment into a single part.
///
/// A fragment that spans multiple parts (e.g., an exclusive group answering independent patterns
/// at one source) can only be used if these parts are planned together. Merged parts take the
/// position of their first member, so the parts stay ordered by their smallest triple id.
pub(crate) fn merge_spanned_parts(
    mut parts: Vec<TripleSet>,
    fragments: &[Arc<Fragment>],
) -> Vec<TripleSet> {
    for fragment in fragments {
        let mut merged: Option<(usize, TripleSet)> = None;
        let mut spanned = 0;
        let mut remaining = Vec::with_capacity(parts.len());
        for part in parts {
            if part.is_disjoint(fragment.triples()) {
                remaining.push(part);
                continue;
            }
            spanned += 1;
            if let Some((_, triples)) = merged.as_mut() {
                triples.union_with(&part);
            } else {
                merged = Some((remaining.len(), part));
            }
        }
        if let Some((position, triples)) = merged {
            if spanned > 1 {
                debug!("The fragment {fragment} joins the independent parts {triples}");
            }
            remaining.insert(position, triples);
        }
        parts = remaining;
    }
    parts
}

fn find(parents: &mut [usize], element: usize) -> usize {
    let mut root = element;
    while parents[root] != root {
        root = parents[root];
    }
    let mut current = element;
    while parents[current] != root {
        let next = parents[current];
        parents[current] = root;
        current = next;
    }
    root
}

/// Merges the sets of `lhs` and `rhs`, keeping the smaller root.
fn merge(parents: &mut [usize], lhs: usize, rhs: usize) {
    let lhs = find(parents, lhs);
    let rhs = find(parents, rhs);
    if lhs != rhs {
        parents[lhs.max(rhs)] = lhs.min(rhs);
    }
}
