//! Per-table operation counters

/// Counters updated as a side effect of every table operation.
///
/// The counters only grow. A table exposes a copy through `stats()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationStats {
    /// Slots examined by fresh insertions.
    ///
    /// An insert that reuses a tombstone keeps scanning until an Empty slot to rule
    /// out a live copy of the key, and every slot of that scan is counted, not only
    /// the ones up to the reused slot.
    pub total_probes_insert: u64,
    /// Slots examined by searches, hits and misses alike
    pub total_probes_search: u64,
    /// Slots examined by erasures, found or not
    pub total_probes_delete: u64,
    /// Insertions whose first slot was already occupied
    pub total_collisions: u64,
    /// Fresh insertions
    pub n_insert: u64,
    /// Searches
    pub n_search: u64,
    /// Erasures
    pub n_delete: u64,
}

/// Divides two counters, yielding 0 when the denominator is 0
#[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}

impl OperationStats {
    /// Records a fresh insertion that examined `probes` slots
    pub(crate) fn record_insert(&mut self, probes: u64, collided: bool) {
        self.total_probes_insert = self.total_probes_insert.saturating_add(probes);
        self.n_insert = self.n_insert.saturating_add(1);
        self.record_collision(collided);
    }

    /// Records a collision on the first probe, if there was one
    pub(crate) fn record_collision(&mut self, collided: bool) {
        if collided {
            self.total_collisions = self.total_collisions.saturating_add(1);
        }
    }

    /// Records a search that examined `probes` slots
    pub(crate) fn record_search(&mut self, probes: u64) {
        self.total_probes_search = self.total_probes_search.saturating_add(probes);
        self.n_search = self.n_search.saturating_add(1);
    }

    /// Records an erasure that examined `probes` slots
    pub(crate) fn record_delete(&mut self, probes: u64) {
        self.total_probes_delete = self.total_probes_delete.saturating_add(probes);
        self.n_delete = self.n_delete.saturating_add(1);
    }

    /// Average slots examined per fresh insertion
    #[must_use]
    pub fn avg_probes_insert(&self) -> f64 {
        ratio(self.total_probes_insert, self.n_insert)
    }

    /// Average slots examined per search
    #[must_use]
    pub fn avg_probes_search(&self) -> f64 {
        ratio(self.total_probes_search, self.n_search)
    }

    /// Average slots examined per erasure
    #[must_use]
    pub fn avg_probes_delete(&self) -> f64 {
        ratio(self.total_probes_delete, self.n_delete)
    }

    /// Percentage of fresh insertions whose first slot was occupied
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)]
    pub fn collision_rate(&self) -> f64 {
        100.0 * ratio(self.total_collisions, self.n_insert)
    }

    /// Adds the counters of `other` to these
    pub fn merge(&mut self, other: &Self) {
        self.total_probes_insert = self.total_probes_insert.saturating_add(other.total_probes_insert);
        self.total_probes_search = self.total_probes_search.saturating_add(other.total_probes_search);
        self.total_probes_delete = self.total_probes_delete.saturating_add(other.total_probes_delete);
        self.total_collisions = self.total_collisions.saturating_add(other.total_collisions);
        self.n_insert = self.n_insert.saturating_add(other.n_insert);
        self.n_search = self.n_search.saturating_add(other.n_search);
        self.n_delete = self.n_delete.saturating_add(other.n_delete);
    }
}
