// deadreck_sim/src/prelude.rs

// Re-export the entire deadreck_core prelude so you can easily access
// pure types like `Pose`, `BitPair`, `OdometryIntegrator`, etc.
pub use deadreck_core::prelude::*;

// Re-export common simulation-specific types.
pub use crate::error::SimError;
pub use crate::simulation::config::structs::*;
pub use crate::simulation::config::{load_scenario, parse_scenario};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::robot::{SimulatedRobot, TickReport};
pub use crate::simulation::scenario::{RunReport, ScenarioRunner, TrajectoryPoint};
pub use crate::simulation::sensors::encoder::{simulate_encoder, EncoderSimulator};
pub use crate::simulation::vehicles::differential::DifferentialDriveTruth;
