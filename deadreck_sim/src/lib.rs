// deadreck_sim/src/lib.rs

// This prelude is for convenience for other files WITHIN the deadreck_sim crate.
pub mod prelude;

pub mod cli;
pub mod error;

// Ground truth, simulated sensors and the scenario runner.
pub mod simulation;
