//! Benchmark harness comparing the probing strategies
//!
//! A run inserts one workload into a fresh table per strategy, then searches present
//! keys, searches absent keys, and erases a subset of keys. Every phase is timed. The
//! table's [`OperationStats`] and [`ClusterStats`] are collected alongside.
//! [`run_experiment`] repeats runs for several load factors and averages the results.

use std::{
    fmt,
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::index};
use thiserror::Error;

use crate::{
    cluster::ClusterStats,
    error::TableError,
    primes::capacity_for,
    probe::{DoubleHashProbe, LinearProbe, ProbeSequence, ProbeStrategy, QuadraticProbe},
    stats::OperationStats,
    table::OpenAddressingTable,
};

/// Smallest capacity an experiment uses, so every strategy can be built
const MIN_EXPERIMENT_CAPACITY: usize = 3;

/// Length of a run of consecutive keys in a clustered workload
const CLUSTER_RUN: usize = 8;

/// Keys are drawn from a range this many times larger than the key count
const KEY_SPREAD: usize = 10;

/// Configuration errors and table failures surfaced by the harness
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExperimentError {
    #[error("element count must be positive")]
    NoElements,
    #[error("at least one load factor is required")]
    NoLoadFactors,
    #[error("load factor {0} is outside (0, 1]")]
    InvalidLoadFactor(f64),
    #[error("at least one run is required")]
    NoRuns,
    #[error("{requested} searches requested but only {available} keys are inserted")]
    TooManySearches { requested: usize, available: usize },
    #[error("{requested} deletions requested but only {available} keys are inserted")]
    TooManyDeletes { requested: usize, available: usize },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Shape of the generated key set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum KeyDistribution {
    /// Unique keys spread uniformly over a range ten times the key count
    #[default]
    Random,
    /// `0, 1, 2, ...`
    Sequential,
    /// Runs of consecutive keys starting at random bases
    Clustered,
}

/// Parameters of a full experiment
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    /// Keys inserted into each table
    pub elements: usize,
    /// Load factors to compare, each sizes its own tables
    pub load_factors: Vec<f64>,
    /// Searches for inserted keys
    pub searches: usize,
    /// Searches for absent keys
    pub misses: usize,
    /// Erasures of inserted keys
    pub deletes: usize,
    /// Repetitions averaged per load factor
    pub runs: usize,
    /// Seed of the workload generator
    pub seed: u64,
    /// Shape of the key set
    pub distribution: KeyDistribution,
    /// Strategies to compare
    pub strategies: Vec<ProbeStrategy>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            elements: 10_000,
            load_factors: vec![0.7, 0.5],
            searches: 5_000,
            misses: 5_000,
            deletes: 1_000,
            runs: 3,
            seed: 42,
            distribution: KeyDistribution::Random,
            strategies: ProbeStrategy::ALL.to_vec(),
        }
    }
}

impl ExperimentConfig {
    /// Checks the configuration before any table is built
    ///
    /// # Errors
    ///
    /// Returns the first [`ExperimentError`] describing an invalid parameter.
    pub fn validate(&self) -> Result<(), ExperimentError> {
        if self.elements == 0 {
            return Err(ExperimentError::NoElements);
        }
        if self.load_factors.is_empty() {
            return Err(ExperimentError::NoLoadFactors);
        }
        if let Some(&bad) =
            self.load_factors.iter().find(|&&lf| !(lf.is_finite() && lf > 0.0 && lf <= 1.0))
        {
            return Err(ExperimentError::InvalidLoadFactor(bad));
        }
        if self.runs == 0 {
            return Err(ExperimentError::NoRuns);
        }
        if self.searches > self.elements {
            return Err(ExperimentError::TooManySearches {
                requested: self.searches,
                available: self.elements,
            });
        }
        if self.deletes > self.elements {
            return Err(ExperimentError::TooManyDeletes {
                requested: self.deletes,
                available: self.elements,
            });
        }
        Ok(())
    }

    /// Table capacity used for a load factor
    #[must_use]
    pub fn capacity_for(&self, load_factor: f64) -> usize {
        capacity_for(self.elements, load_factor).max(MIN_EXPERIMENT_CAPACITY)
    }

    /// Strategies to run, all of them when none were selected
    fn selected_strategies(&self) -> Vec<ProbeStrategy> {
        if self.strategies.is_empty() { ProbeStrategy::ALL.to_vec() } else { self.strategies.clone() }
    }
}

/// Keys and operation sets fed to one run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Workload {
    /// Unique keys, in insertion order
    pub keys: Vec<u64>,
    /// Indices into `keys` to search for
    pub search_hits: Vec<usize>,
    /// Keys absent from `keys`
    pub search_misses: Vec<u64>,
    /// Indices into `keys` to erase
    pub deletes: Vec<usize>,
}

/// Seeded source of workloads
#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    /// Random source owned by this generator
    rng: StdRng,
    /// Shape of the key set
    distribution: KeyDistribution,
}

impl WorkloadGenerator {
    /// Creates a generator with a deterministic seed
    #[must_use]
    pub fn new(seed: u64, distribution: KeyDistribution) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), distribution }
    }

    /// Builds a workload of `elements` keys.
    ///
    /// Search and delete counts larger than `elements` are capped to it.
    pub fn generate(
        &mut self,
        elements: usize,
        searches: usize,
        misses: usize,
        deletes: usize,
    ) -> Workload {
        let keys = self.keys(elements);
        let search_hits = index::sample(&mut self.rng, elements, searches.min(elements)).into_vec();
        let deletes = index::sample(&mut self.rng, elements, deletes.min(elements)).into_vec();

        let floor = keys.iter().max().map_or(0, |&max| max.saturating_add(1));
        let ceiling = floor.saturating_add(to_u64(elements.saturating_mul(KEY_SPREAD)).max(1));
        let search_misses = (0..misses).map(|_| self.rng.random_range(floor..ceiling)).collect();

        Workload { keys, search_hits, search_misses, deletes }
    }

    /// Generates `count` unique keys following the configured distribution
    fn keys(&mut self, count: usize) -> Vec<u64> {
        match self.distribution {
            KeyDistribution::Sequential => (0..to_u64(count)).collect(),
            KeyDistribution::Random => {
                let span = count.saturating_mul(KEY_SPREAD);
                index::sample(&mut self.rng, span, count).into_iter().map(to_u64).collect()
            }
            KeyDistribution::Clustered => {
                let blocks = count.div_ceil(CLUSTER_RUN);
                let span = blocks.saturating_mul(KEY_SPREAD);
                index::sample(&mut self.rng, span, blocks)
                    .into_iter()
                    .flat_map(|block| {
                        let base = block.saturating_mul(CLUSTER_RUN);
                        (base..base.saturating_add(CLUSTER_RUN)).map(to_u64)
                    })
                    .take(count)
                    .collect()
            }
        }
    }
}

/// Widens a `usize` into a key
#[allow(clippy::cast_possible_truncation)]
fn to_u64(value: usize) -> u64 {
    value as u64
}

/// Measurements of one strategy, for one run or averaged over several
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Strategy measured
    pub strategy: ProbeStrategy,
    /// Slots in the table
    pub capacity: usize,
    /// Number of runs folded into this report
    pub runs: u32,
    /// Time spent inserting every key
    pub insert_time: Duration,
    /// Time spent on hit and miss searches
    pub search_time: Duration,
    /// Time spent erasing
    pub delete_time: Duration,
    /// Counters, summed over `runs`
    pub stats: OperationStats,
    /// Clustering right after the insert phase
    pub clusters: ClusterStats,
    /// Insertions the table refused, summed over `runs`
    pub failed_inserts: usize,
    /// Hit searches that found their key, summed over `runs`
    pub hits_found: usize,
}

impl RunReport {
    /// Averages reports of the same strategy and capacity.
    ///
    /// Durations and cluster figures are averaged. Counters are summed so rates stay
    /// exact, use [`RunReport::per_run`] to read them per run.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
    pub fn average(reports: &[Self]) -> Option<Self> {
        let first = reports.first()?;
        let count = u32::try_from(reports.len()).ok()?;

        let mean = |pick: fn(&Self) -> Duration| {
            reports.iter().map(pick).sum::<Duration>().checked_div(count).unwrap_or_default()
        };

        let mut stats = OperationStats::default();
        let mut runs: u32 = 0;
        let mut max_length: usize = 0;
        let mut avg_length = 0.0;
        let mut clusters: usize = 0;
        let mut failed_inserts: usize = 0;
        let mut hits_found: usize = 0;
        for report in reports {
            stats.merge(&report.stats);
            runs = runs.saturating_add(report.runs);
            max_length = max_length.saturating_add(report.clusters.max_length);
            avg_length += report.clusters.avg_length;
            clusters = clusters.saturating_add(report.clusters.clusters);
            failed_inserts = failed_inserts.saturating_add(report.failed_inserts);
            hits_found = hits_found.saturating_add(report.hits_found);
        }
        let len = reports.len();

        Some(Self {
            strategy: first.strategy,
            capacity: first.capacity,
            runs,
            insert_time: mean(|r| r.insert_time),
            search_time: mean(|r| r.search_time),
            delete_time: mean(|r| r.delete_time),
            stats,
            clusters: ClusterStats {
                max_length: max_length / len,
                avg_length: avg_length / len as f64,
                clusters: clusters / len,
            },
            failed_inserts,
            hits_found,
        })
    }

    /// Divides a summed counter by the number of runs
    #[must_use]
    pub fn per_run(&self, total: u64) -> u64 {
        total.checked_div(u64::from(self.runs)).unwrap_or(0)
    }
}

/// Runs one workload against a fresh table of the given strategy
///
/// # Errors
///
/// Returns [`ExperimentError::Table`] if the table cannot be built with `capacity`.
pub fn run_strategy<P: ProbeSequence>(
    capacity: usize,
    workload: &Workload,
) -> Result<RunReport, ExperimentError> {
    let mut table = OpenAddressingTable::<u64, u64, P>::new(capacity)?;

    let started = Instant::now();
    let mut failed_inserts: usize = 0;
    for &key in &workload.keys {
        if !table.insert(key, key) {
            failed_inserts = failed_inserts.saturating_add(1);
        }
    }
    let insert_time = started.elapsed();
    let clusters = table.cluster_stats();

    let started = Instant::now();
    let mut hits_found: usize = 0;
    for key in workload.search_hits.iter().filter_map(|&i| workload.keys.get(i)) {
        if table.search(key).is_some() {
            hits_found = hits_found.saturating_add(1);
        }
    }
    let mut misses_found: usize = 0;
    for key in &workload.search_misses {
        if table.search(key).is_some() {
            misses_found = misses_found.saturating_add(1);
        }
    }
    let search_time = started.elapsed();

    let started = Instant::now();
    let mut erased: usize = 0;
    for key in workload.deletes.iter().filter_map(|&i| workload.keys.get(i)) {
        if table.erase(key) {
            erased = erased.saturating_add(1);
        }
    }
    let delete_time = started.elapsed();

    if failed_inserts > 0 {
        warn!("{}: {failed_inserts} of {} inserts failed", P::NAME, workload.keys.len());
    }
    if misses_found > 0 {
        warn!("{}: {misses_found} searches for absent keys reported a hit", P::NAME);
    }
    debug!(
        "{}: capacity {capacity}, {erased} keys erased, {} tombstones left",
        P::NAME,
        table.tombstone_count()
    );

    Ok(RunReport {
        strategy: P::STRATEGY,
        capacity,
        runs: 1,
        insert_time,
        search_time,
        delete_time,
        stats: table.stats(),
        clusters,
        failed_inserts,
        hits_found,
    })
}

/// Runs one workload against the strategy named at runtime
///
/// # Errors
///
/// See [`run_strategy`].
pub fn run(
    strategy: ProbeStrategy,
    capacity: usize,
    workload: &Workload,
) -> Result<RunReport, ExperimentError> {
    match strategy {
        ProbeStrategy::DoubleHash => run_strategy::<DoubleHashProbe>(capacity, workload),
        ProbeStrategy::Linear => run_strategy::<LinearProbe>(capacity, workload),
        ProbeStrategy::Quadratic => run_strategy::<QuadraticProbe>(capacity, workload),
    }
}

/// Averaged results of every strategy at one load factor
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFactorReport {
    /// Requested load factor
    pub load_factor: f64,
    /// Capacity derived from it
    pub capacity: usize,
    /// One averaged report per strategy
    pub results: Vec<RunReport>,
}

/// Results of a full experiment
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    /// Configuration the experiment ran with
    pub config: ExperimentConfig,
    /// One entry per load factor, in configuration order
    pub load_factors: Vec<LoadFactorReport>,
}

impl ExperimentReport {
    /// Timing comparison, one row per phase and load factor
    #[must_use]
    pub fn summary(&self) -> SummaryTable<'_> {
        SummaryTable { report: self }
    }

    /// Probe and collision statistics, one row per strategy and load factor
    #[must_use]
    pub fn detail(&self) -> DetailTable<'_> {
        DetailTable { report: self }
    }

    /// Strategies present in the report, in column order
    fn strategies(&self) -> Vec<ProbeStrategy> {
        self.load_factors
            .first()
            .map(|lf| lf.results.iter().map(|r| r.strategy).collect())
            .unwrap_or_default()
    }
}

/// Runs every configured strategy at every load factor and averages the runs.
///
/// All strategies of a run share the same workload. A new workload is drawn for each
/// run from a single generator seeded with `config.seed`.
///
/// # Errors
///
/// Returns an [`ExperimentError`] if the configuration is invalid or a table cannot
/// be built.
pub fn run_experiment(config: &ExperimentConfig) -> Result<ExperimentReport, ExperimentError> {
    config.validate()?;
    let strategies = config.selected_strategies();
    let mut generator = WorkloadGenerator::new(config.seed, config.distribution);
    let mut load_factors = Vec::with_capacity(config.load_factors.len());

    for &load_factor in &config.load_factors {
        let capacity = config.capacity_for(load_factor);
        info!("load factor {load_factor:.2}: {} keys into {capacity} slots", config.elements);

        let mut per_strategy: Vec<Vec<RunReport>> = vec![Vec::new(); strategies.len()];
        for run_index in 0..config.runs {
            let workload = generator.generate(
                config.elements,
                config.searches,
                config.misses,
                config.deletes,
            );
            debug!("run {run_index}: {} keys generated", workload.keys.len());
            for (strategy, reports) in strategies.iter().zip(per_strategy.iter_mut()) {
                reports.push(run(*strategy, capacity, &workload)?);
            }
        }

        let results =
            per_strategy.iter().map(Vec::as_slice).filter_map(RunReport::average).collect();
        load_factors.push(LoadFactorReport { load_factor, capacity, results });
    }

    Ok(ExperimentReport { config: config.clone(), load_factors })
}

/// Renders the timing comparison of an [`ExperimentReport`], in microseconds
#[derive(Debug, Clone, Copy)]
pub struct SummaryTable<'a> {
    /// Report being rendered
    report: &'a ExperimentReport,
}

impl fmt::Display for SummaryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n===== TABLE OF PERFORMANCE COMPARISON (us) =====")?;
        write!(f, "{:<30}", " ")?;
        for strategy in self.report.strategies() {
            write!(f, "{:<20}", strategy.name())?;
        }
        writeln!(f)?;

        let phases: [(&str, fn(&RunReport) -> Duration); 3] = [
            ("Insert", |r| r.insert_time),
            ("Search", |r| r.search_time),
            ("Delete", |r| r.delete_time),
        ];
        for (phase, pick) in phases {
            for (i, lf) in self.report.load_factors.iter().enumerate() {
                let label = format!("[{phase}] LF{} ({:.2}):", i.saturating_add(1), lf.load_factor);
                write!(f, "{label:<30}")?;
                for result in &lf.results {
                    write!(f, "{:<20}", pick(result).as_micros())?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Renders the probe statistics of an [`ExperimentReport`]
#[derive(Debug, Clone, Copy)]
pub struct DetailTable<'a> {
    /// Report being rendered
    report: &'a ExperimentReport,
}

impl fmt::Display for DetailTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<20}{:<12}{:<10}{:<12}{:<10}{:<12}{:<10}{:<12}{:<10}{:<12}{:<10}{:<10}",
            "Algorithm",
            "LoadFac",
            "Insert",
            "Probe/Ins",
            "Coll",
            "CollRate",
            "Search",
            "Probe/S",
            "Delete",
            "Probe/D",
            "MaxClus",
            "AvgClus"
        )?;
        writeln!(f, "{}", "-".repeat(142))?;

        for lf in &self.report.load_factors {
            for result in &lf.results {
                let stats = &result.stats;
                writeln!(
                    f,
                    "{:<20}{:<12.2}{:<10}{:<12.4}{:<10}{:<12.4}{:<10}{:<12.4}{:<10}{:<12.4}{:<10}{:<10.2}",
                    result.strategy.name(),
                    lf.load_factor,
                    result.per_run(stats.n_insert),
                    stats.avg_probes_insert(),
                    result.per_run(stats.total_collisions),
                    stats.collision_rate(),
                    result.per_run(stats.n_search),
                    stats.avg_probes_search(),
                    result.per_run(stats.n_delete),
                    stats.avg_probes_delete(),
                    result.clusters.max_length,
                    result.clusters.avg_length,
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn small_config() -> ExperimentConfig {
        ExperimentConfig {
            elements: 200,
            load_factors: vec![0.9, 0.5],
            searches: 100,
            misses: 50,
            deletes: 40,
            runs: 2,
            seed: 7,
            distribution: KeyDistribution::Random,
            strategies: Vec::new(),
        }
    }

    #[test]
    fn test_validate() {
        assert_eq!(small_config().validate(), Ok(()));

        let config = ExperimentConfig { elements: 0, ..small_config() };
        assert_eq!(config.validate(), Err(ExperimentError::NoElements));

        let config = ExperimentConfig { load_factors: vec![0.5, 1.5], ..small_config() };
        assert_eq!(config.validate(), Err(ExperimentError::InvalidLoadFactor(1.5)));

        let config = ExperimentConfig { searches: 201, ..small_config() };
        assert_eq!(
            config.validate(),
            Err(ExperimentError::TooManySearches { requested: 201, available: 200 })
        );

        let config = ExperimentConfig { runs: 0, ..small_config() };
        assert_eq!(config.validate(), Err(ExperimentError::NoRuns));
    }

    #[test]
    fn test_workloads_have_unique_keys() {
        for distribution in [
            KeyDistribution::Random,
            KeyDistribution::Sequential,
            KeyDistribution::Clustered,
        ] {
            let mut generator = WorkloadGenerator::new(1, distribution);
            let workload = generator.generate(100, 30, 20, 10);

            let unique: HashSet<u64> = workload.keys.iter().copied().collect();
            assert_eq!(workload.keys.len(), 100, "{distribution:?}");
            assert_eq!(unique.len(), 100, "{distribution:?}");
            assert_eq!(workload.search_hits.len(), 30);
            assert_eq!(workload.deletes.len(), 10);
            assert!(workload.search_hits.iter().all(|&i| i < 100));
            assert!(workload.search_misses.iter().all(|key| !unique.contains(key)));
        }
    }

    #[test]
    fn test_generator_is_deterministic() {
        let first = WorkloadGenerator::new(99, KeyDistribution::Clustered).generate(50, 10, 10, 10);
        let second = WorkloadGenerator::new(99, KeyDistribution::Clustered).generate(50, 10, 10, 10);
        assert_eq!(first, second);
    }

    #[test]
    fn test_clustered_keys_come_in_runs() {
        let workload = WorkloadGenerator::new(3, KeyDistribution::Clustered).generate(16, 0, 0, 0);
        for run in workload.keys.chunks(CLUSTER_RUN) {
            assert!(run.windows(2).all(|pair| matches!(pair, [a, b] if a + 1 == *b)));
        }
    }

    #[test]
    fn test_run_strategy_counts() -> Result<(), ExperimentError> {
        let workload = WorkloadGenerator::new(5, KeyDistribution::Random).generate(50, 20, 10, 5);
        for strategy in ProbeStrategy::ALL {
            let report = run(strategy, 101, &workload)?;
            assert_eq!(report.strategy, strategy);
            assert_eq!(report.failed_inserts, 0);
            assert_eq!(report.hits_found, 20);
            assert_eq!(report.stats.n_insert, 50);
            assert_eq!(report.stats.n_search, 30);
            assert_eq!(report.stats.n_delete, 5);
            assert!(report.stats.avg_probes_insert() >= 1.0);
        }
        Ok(())
    }

    #[test]
    fn test_report_strategy_follows_probe_type() -> Result<(), ExperimentError> {
        let workload = WorkloadGenerator::new(9, KeyDistribution::Sequential).generate(10, 5, 5, 2);
        assert_eq!(run_strategy::<QuadraticProbe>(31, &workload)?.strategy, ProbeStrategy::Quadratic);
        assert_eq!(run_strategy::<LinearProbe>(31, &workload)?.strategy, ProbeStrategy::Linear);
        assert_eq!(
            run_strategy::<DoubleHashProbe>(31, &workload)?.strategy,
            ProbeStrategy::DoubleHash
        );
        Ok(())
    }

    #[test]
    fn test_run_experiment() -> Result<(), ExperimentError> {
        let config = small_config();
        let report = run_experiment(&config)?;

        assert_eq!(report.load_factors.len(), 2);
        let first = report.load_factors.first().ok_or(ExperimentError::NoLoadFactors)?;
        assert_eq!(first.capacity, 223);
        assert_eq!(first.results.len(), 3);
        for result in &first.results {
            assert_eq!(result.runs, 2);
            // quadratic probing may refuse a few keys this close to full
            let attempted = result.stats.n_insert + result.failed_inserts as u64;
            assert_eq!(attempted, 400);
        }

        // below half load every strategy places every key of a prime table
        let second = report.load_factors.get(1).ok_or(ExperimentError::NoLoadFactors)?;
        assert_eq!(second.capacity, 401);
        for result in &second.results {
            assert_eq!(result.failed_inserts, 0);
            assert_eq!(result.per_run(result.stats.n_insert), 200);
            assert_eq!(result.hits_found, 200);
        }

        let summary = report.summary().to_string();
        assert!(summary.contains("[Insert] LF1 (0.90):"));
        assert!(summary.contains("[Delete] LF2 (0.50):"));
        assert!(summary.contains("Quadratic Probing"));

        let detail = report.detail().to_string();
        assert!(detail.starts_with("Algorithm"));
        assert_eq!(detail.lines().count(), 2 + 2 * 3);
        Ok(())
    }

    #[test]
    fn test_selected_strategies() -> Result<(), ExperimentError> {
        let config = ExperimentConfig {
            strategies: vec![ProbeStrategy::Linear],
            load_factors: vec![0.5],
            ..small_config()
        };
        let report = run_experiment(&config)?;
        let strategies: Vec<ProbeStrategy> = report
            .load_factors
            .iter()
            .flat_map(|lf| lf.results.iter().map(|r| r.strategy))
            .collect();
        assert_eq!(strategies, vec![ProbeStrategy::Linear]);
        Ok(())
    }

    #[test]
    fn test_average_of_nothing() {
        assert_eq!(RunReport::average(&[]), None);
    }
}
