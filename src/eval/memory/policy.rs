//! Collection threshold policy
//!
//! A collection is due once the tracked population reaches the
//! threshold. After each collection the threshold becomes twice the
//! surviving population, but never less than the floor (the initial
//! threshold) so that a small or empty live set does not force a
//! collection on every allocation.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcPolicy {
    floor: usize,
    threshold: usize,
}

impl GcPolicy {
    pub fn new(initial_threshold: usize) -> Self {
        GcPolicy {
            floor: initial_threshold,
            threshold: initial_threshold,
        }
    }

    pub fn floor(&self) -> usize {
        self.floor
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Whether the next allocation must be preceded by a collection
    pub fn requires_collection(&self, tracked: usize) -> bool {
        tracked >= self.threshold
    }

    /// Recompute the threshold from the post-sweep population
    pub fn recompute(&mut self, survivors: usize) -> usize {
        self.threshold = self.floor.max(survivors.saturating_mul(2));
        self.threshold
    }
}
