//! Compares double hashing, linear probing and quadratic probing on generated workloads.

use std::{error::Error, path::PathBuf};

use clap::Parser;
use log::info;
use probe_lab::{
    ProbeStrategy,
    experiment::{ExperimentConfig, KeyDistribution, run_experiment},
    initialize_logger,
    plot::render_probe_chart,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of keys inserted into every table
    #[arg(short, long, default_value_t = 10_000)]
    elements: usize,

    /// Load factors to compare; each one sizes its own tables
    #[arg(short, long = "load-factor", default_values_t = vec![0.7, 0.5])]
    load_factors: Vec<f64>,

    /// Searches for inserted keys [default: half of the elements]
    #[arg(short, long)]
    searches: Option<usize>,

    /// Searches for absent keys [default: same as --searches]
    #[arg(short, long)]
    misses: Option<usize>,

    /// Erasures of inserted keys [default: a tenth of the elements]
    #[arg(short, long)]
    deletes: Option<usize>,

    /// Repetitions averaged per load factor
    #[arg(short, long, default_value_t = 3)]
    runs: usize,

    /// Seed of the workload generator
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Shape of the key set
    #[arg(long, value_enum, default_value_t = KeyDistribution::Random)]
    distribution: KeyDistribution,

    /// Strategies to compare [default: all]
    #[arg(long = "strategy", value_enum)]
    strategies: Vec<ProbeStrategy>,

    /// Write an SVG chart of average probes per operation to this path
    #[arg(long)]
    plot: Option<PathBuf>,
}

impl Args {
    /// Resolves the optional counts against the element count
    fn config(&self) -> ExperimentConfig {
        let searches = self.searches.unwrap_or(self.elements / 2);
        ExperimentConfig {
            elements: self.elements,
            load_factors: self.load_factors.clone(),
            searches,
            misses: self.misses.unwrap_or(searches),
            deletes: self.deletes.unwrap_or(self.elements / 10),
            runs: self.runs,
            seed: self.seed,
            distribution: self.distribution,
            strategies: self.strategies.clone(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    initialize_logger();
    let args = Args::parse();
    let config = args.config();
    config.validate()?;

    for &load_factor in &config.load_factors {
        info!("capacity for load factor {load_factor:.2}: {}", config.capacity_for(load_factor));
    }

    let report = run_experiment(&config)?;
    println!("{}", report.summary());
    println!("{}", report.detail());

    if let Some(path) = &args.plot {
        render_probe_chart(&report, path)?;
        info!("wrote probe chart to {}", path.display());
    }

    Ok(())
}
