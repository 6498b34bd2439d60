//! Error types reported by tables

use thiserror::Error;

/// Failures of table construction and insertion.
///
/// Misses on search and erase are ordinary return values and never show up here.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    #[error("table capacity must be positive")]
    ZeroCapacity,
    #[error("capacity {capacity} is too small for this probe sequence (minimum {minimum})")]
    CapacityTooSmall { capacity: usize, minimum: usize },
    #[error("table is full ({capacity} slots occupied)")]
    TableFull { capacity: usize },
    #[error("no free slot reached after {attempts} probe attempts")]
    ProbeExhausted { attempts: usize },
}
