/// Holds the configuration of a [FederatedJoinPlanner](crate::FederatedJoinPlanner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// The maximum number of visited node sets remembered by a single path search. Forgetting a
    /// node set only causes the search to recompute it if it is reached again.
    pub memo_capacity: usize,
    /// The number of join components above which the join trees are planned in parallel.
    pub parallel_threshold: usize,
    /// The maximum number of samples kept for each kind of diagnostic.
    pub max_diagnostic_samples: usize,
    /// Dead ends of the search that leave at most this many triples uncovered are reported as
    /// near misses.
    pub near_miss_max_uncovered: usize,
}

impl PlannerConfig {
    #[must_use]
    pub fn with_memo_capacity(self, memo_capacity: usize) -> Self {
        Self {
            memo_capacity,
            ..self
        }
    }

    #[must_use]
    pub fn with_parallel_threshold(self, parallel_threshold: usize) -> Self {
        Self {
            parallel_threshold,
            ..self
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            memo_capacity: 1 << 16,
            parallel_threshold: 10,
            max_diagnostic_samples: 8,
            near_miss_max_uncovered: 2,
        }
    }
}
