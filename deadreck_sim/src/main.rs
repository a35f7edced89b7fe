// deadreck_sim/src/main.rs

use std::fs::File;
use std::io::BufWriter;

use clap::Parser;
use deadreck_sim::cli::Cli;
use deadreck_sim::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    // --- 1. Logging ---
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Err(e) = run(Cli::parse()) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), SimError> {
    // --- 2. Resolve the scenario ---
    let config = load_scenario(cli.scenario.as_deref(), cli.seed)?;
    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    // --- 3. Run it ---
    let report = ScenarioRunner::new(config)?.run();
    info!(
        "Finished {} ticks ({:.2}s) | Pos Err: {:.3} (max {:.3}) | Att Err: {:.3}° | Faults: {}",
        report.ticks,
        report.duration,
        report.final_error.position,
        report.max_position_error,
        report.final_error.angle_degrees(),
        report.decoder_faults,
    );

    // --- 4. Write the report ---
    if let Some(path) = &cli.output {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &report)?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}
