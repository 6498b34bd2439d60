//! Run-length analysis of occupied slots

use crate::slot::SlotState;

/// Lengths of the runs of consecutive occupied slots in a table.
///
/// The scan goes left to right over the slot array and does not join a run at the
/// end of the array with one at the start.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClusterStats {
    /// Longest run
    pub max_length: usize,
    /// Mean run length, 0 when there are no runs
    pub avg_length: f64,
    /// Number of runs
    pub clusters: usize,
}

impl ClusterStats {
    /// Scans slot states and measures every run of occupied slots
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
    pub fn analyze<I>(states: I) -> Self
    where
        I: IntoIterator<Item = SlotState>,
    {
        let mut max_length: usize = 0;
        let mut total: usize = 0;
        let mut clusters: usize = 0;
        let mut current: usize = 0;

        for state in states {
            if state == SlotState::Occupied {
                current = current.saturating_add(1);
                continue;
            }
            if current > 0 {
                max_length = max_length.max(current);
                total = total.saturating_add(current);
                clusters = clusters.saturating_add(1);
                current = 0;
            }
        }
        if current > 0 {
            max_length = max_length.max(current);
            total = total.saturating_add(current);
            clusters = clusters.saturating_add(1);
        }

        let avg_length = if clusters == 0 { 0.0 } else { total as f64 / clusters as f64 };
        Self { max_length, avg_length, clusters }
    }
}
