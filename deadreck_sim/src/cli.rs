// deadreck_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// deadreck: dead-reckoning from simulated quadrature wheel encoders.
///
/// Runs a scripted drive, decodes the simulated encoder signals into an
/// odometry estimate and reports how far it drifted from the ground truth.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run. Built-in defaults are used
    /// when omitted.
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,

    /// Seed for the random number generator. Overrides the scenario file.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the run report, including the sampled trajectory, as JSON.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the fully resolved scenario as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub print_config: bool,
}
