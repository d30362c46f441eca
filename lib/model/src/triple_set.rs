use roaring::RoaringBitmap;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// The identifier of a single triple pattern within a [TripleUniverse](crate::TripleUniverse).
///
/// Identifiers are dense and stable for the lifetime of the universe. They are the unit of all
/// bit-vector operations in the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TripleId(u32);

impl TripleId {
    /// Creates a new [TripleId].
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the identifier as an index into dense vectors.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Display for TripleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A set of [TripleId]s backed by a compressed bitmap.
///
/// Equality and hashing are defined over the contained identifiers, so two sets built in a
/// different insertion order are interchangeable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TripleSet(RoaringBitmap);

impl TripleSet {
    /// Creates an empty [TripleSet].
    pub fn new() -> Self {
        Self(RoaringBitmap::new())
    }

    /// Adds `id` to the set. Returns whether the id was newly inserted.
    pub fn insert(&mut self, id: TripleId) -> bool {
        self.0.insert(id.as_u32())
    }

    pub fn contains(&self, id: TripleId) -> bool {
        self.0.contains(id.as_u32())
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "A bitmap over u32 ids never holds more than u32::MAX + 1 elements"
    )]
    pub fn len(&self) -> usize {
        self.0.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the contained ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TripleId> + '_ {
        self.0.iter().map(TripleId)
    }

    /// Returns the largest contained id, if any.
    pub fn max(&self) -> Option<TripleId> {
        self.0.max().map(TripleId)
    }

    pub fn is_subset(&self, other: &TripleSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_disjoint(&self, other: &TripleSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    #[must_use]
    pub fn union(&self, other: &TripleSet) -> TripleSet {
        Self(&self.0 | &other.0)
    }

    #[must_use]
    pub fn intersection(&self, other: &TripleSet) -> TripleSet {
        Self(&self.0 & &other.0)
    }

    /// Returns the ids of `self` that are not part of `other`.
    #[must_use]
    pub fn difference(&self, other: &TripleSet) -> TripleSet {
        Self(&self.0 - &other.0)
    }

    /// Adds all ids of `other` to `self`.
    pub fn union_with(&mut self, other: &TripleSet) {
        self.0 |= &other.0;
    }
}

impl Eq for TripleSet {}

impl Hash for TripleSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for id in &self.0 {
            id.hash(state);
        }
    }
}

impl FromIterator<TripleId> for TripleSet {
    fn from_iter<T: IntoIterator<Item = TripleId>>(iter: T) -> Self {
        Self(iter.into_iter().map(TripleId::as_u32).collect())
    }
}

impl Extend<TripleId> for TripleSet {
    fn extend<T: IntoIterator<Item = TripleId>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(TripleId::as_u32));
    }
}

impl Display for TripleSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, id) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        f.write_str("}")
    }
}
