//! # Probe Lab
//!
//! Fixed-capacity open addressing hash tables for comparing collision resolution
//! strategies.
//!
//! This crate provides one table, [`OpenAddressingTable`], driven by one of three
//! probe sequences:
//!
//! - [`DoubleHashProbe`]: step size derived from a second hash of the key
//! - [`LinearProbe`]: consecutive slots
//! - [`QuadraticProbe`]: offsets growing as `i^2`
//!
//! Erased keys leave tombstones behind. Every operation updates the table's
//! [`OperationStats`] (probes, collisions, operation counts), and
//! [`ClusterStats`] measures how keys bunch together in the slot array. Capacity
//! is fixed at construction, the table never resizes.
//!
//! ## Basic Usage
//!
//! ```rust
//! use probe_lab::{DoubleHashTable, TableError};
//!
//! // 11 slots, resolved with double hashing
//! let mut table = DoubleHashTable::new(11)?;
//!
//! // 5 and 16 both start at slot 5
//! assert!(table.insert(5, "five"));
//! assert!(table.insert(16, "sixteen"));
//!
//! assert_eq!(table.search(&16), Some("sixteen"));
//!
//! // Erasing leaves a tombstone that later searches step over
//! assert!(table.erase(&5));
//! assert_eq!(table.search(&5), None);
//! assert_eq!(table.search(&16), Some("sixteen"));
//!
//! let stats = table.stats();
//! assert_eq!(stats.n_insert, 2);
//! assert_eq!(stats.total_collisions, 1);
//! # Ok::<(), TableError>(())
//! ```
//!
//! ## Experiments
//!
//! ```rust
//! use probe_lab::experiment::{ExperimentConfig, run_experiment};
//!
//! let config = ExperimentConfig {
//!     elements: 500,
//!     load_factors: vec![0.5],
//!     searches: 100,
//!     misses: 100,
//!     deletes: 50,
//!     runs: 1,
//!     ..ExperimentConfig::default()
//! };
//! let report = run_experiment(&config)?;
//! println!("{}", report.detail());
//! # Ok::<(), probe_lab::experiment::ExperimentError>(())
//! ```

/// Run-length analysis of occupied slots
mod cluster;
/// Error types
mod error;
/// Benchmark harness: workloads, timed runs and report tables
pub mod experiment;
/// Hash capability required from keys
mod hash;
/// Logger setup for binaries and tests
mod logger;
/// SVG charts of experiment reports
pub mod plot;
/// Prime helpers for sizing tables
pub mod primes;
/// Probe sequences
mod probe;
/// Storage cells
mod slot;
/// Operation counters
mod stats;
/// The open addressing table
mod table;

pub use cluster::ClusterStats;
pub use error::TableError;
pub use hash::KeyHash;
pub use logger::initialize_logger;
pub use probe::{
    DoubleHashProbe, LinearProbe, ProbeSequence, ProbeStrategy, ProbeWalk, QuadraticProbe,
};
pub use slot::{Slot, SlotState};
pub use stats::OperationStats;
pub use table::{
    DoubleHashTable, InsertOutcome, Iter, LinearProbeTable, OpenAddressingTable,
    QuadraticProbeTable,
};
