use crate::graph::NodeSet;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// A bounded memo of the node sets that the search has already enqueued.
///
/// Once the capacity is exhausted, the oldest entry is forgotten. As node sets are remembered when
/// they are enqueued (and every enqueued state is expanded completely), forgetting an entry can
/// only cause a node set to be enqueued and expanded again. It can never cause a node set to be
/// skipped without having been expanded.
///
/// The breadth-first search reaches node sets of size `k + 1` only from node sets of size `k`, so
/// evicting in insertion order forgets the levels that cannot be reached again first.
#[derive(Debug)]
pub(crate) struct VisitedStates {
    seen: FxHashSet<NodeSet>,
    order: VecDeque<NodeSet>,
    capacity: usize,
    evictions: usize,
}

impl VisitedStates {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            seen: FxHashSet::default(),
            order: VecDeque::new(),
            capacity,
            evictions: 0,
        }
    }

    /// Remembers `nodes`. Returns `false` if `nodes` is already remembered.
    pub(crate) fn insert(&mut self, nodes: &NodeSet) -> bool {
        if self.seen.contains(nodes) {
            return false;
        }
        if self.capacity == 0 {
            return true;
        }

        if self.seen.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
                self.evictions += 1;
            }
        }
        self.seen.insert(nodes.clone());
        self.order.push_back(nodes.clone());
        true
    }

    pub(crate) fn evictions(&self) -> usize {
        self.evictions
    }
}
