// deadreck_sim/src/simulation/robot.rs

//! One simulated robot: the ground-truth chassis, its encoder-equipped wheels
//! and the odometry that only ever sees the decoded encoder output.

use deadreck_core::estimation::evaluation::{evaluate, PoseError};
use deadreck_core::estimation::odometry::{
    OdometryIntegrator, OdometryModel, OdometryStats, UnpairedStepPolicy,
};
use deadreck_core::geometry::RobotGeometry;
use deadreck_core::models::encoder::{BitPair, EncoderConfig};
use deadreck_core::models::quadrature::Direction;
use deadreck_core::models::wheel::WheelState;
use deadreck_core::types::{Command, Pose};
use rand::Rng;

use crate::error::SimError;
use crate::simulation::config::ScenarioConfig;
use crate::simulation::sensors::encoder::EncoderSimulator;
use crate::simulation::vehicles::differential::DifferentialDriveTruth;

/// Everything observable about a single tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Simulation time at the end of the tick, in seconds.
    pub time: f64,
    pub bits: Vec<BitPair>,
    pub directions: Vec<Direction>,
    pub true_pose: Pose,
    pub estimated_pose: Pose,
    pub error: PoseError,
}

#[derive(Debug, Clone)]
pub struct SimulatedRobot {
    geometry: RobotGeometry,
    encoder: EncoderSimulator,
    truth: DifferentialDriveTruth,
    wheels: Vec<WheelState>,
    odometry: OdometryIntegrator,
    elapsed: f64,
}

impl SimulatedRobot {
    /// Builds a robot at `initial_pose` with every wheel at angle zero. The
    /// estimate starts at the true pose.
    pub fn new(
        geometry: RobotGeometry,
        encoder: EncoderConfig,
        model: OdometryModel,
        policy: UnpairedStepPolicy,
        initial_pose: Pose,
    ) -> Result<Self, SimError> {
        let wheels = geometry
            .wheels()
            .positions()
            .iter()
            .map(|&position| WheelState::new(position, 0.0, &encoder))
            .collect();

        Ok(Self {
            geometry,
            encoder: EncoderSimulator::new(encoder)?,
            truth: DifferentialDriveTruth::new(geometry, initial_pose),
            wheels,
            odometry: OdometryIntegrator::new(model, policy, initial_pose),
            elapsed: 0.0,
        })
    }

    pub fn from_config(config: &ScenarioConfig) -> Result<Self, SimError> {
        let geometry = config.robot.to_geometry()?;
        let encoder = config.encoder.to_config()?;
        let model = config.odometry.to_model(&geometry, &encoder)?;
        Self::new(
            geometry,
            encoder,
            model,
            config.odometry.unpaired_policy,
            Pose::origin(),
        )
    }

    /// Advances the simulation by one tick of length `dt`.
    pub fn step<R: Rng + ?Sized>(&mut self, command: Command, dt: f64, rng: &mut R) -> TickReport {
        // --- 1. Ground truth follows the command exactly ---
        let deltas = self.truth.advance(command, dt);
        self.elapsed += dt;

        // --- 2. Wheels turn (with slip) and their encoders are read ---
        let mut bits = Vec::with_capacity(self.wheels.len());
        let mut directions = Vec::with_capacity(self.wheels.len());
        for (wheel, delta) in self.wheels.iter_mut().zip(deltas) {
            wheel.rotate(self.encoder.slip(delta, rng));
            let sample = self.encoder.sample(wheel.angle(), rng);
            directions.push(wheel.observe(sample, self.elapsed));
            bits.push(sample);
        }

        // --- 3. Odometry sees only the decoded directions ---
        let estimated_pose = self.odometry.process(&directions);
        let true_pose = *self.truth.pose();

        TickReport {
            time: self.elapsed,
            bits,
            directions,
            true_pose,
            estimated_pose,
            error: evaluate(&true_pose, &estimated_pose),
        }
    }

    pub fn geometry(&self) -> &RobotGeometry {
        &self.geometry
    }

    pub fn encoder(&self) -> &EncoderConfig {
        self.encoder.config()
    }

    pub fn wheels(&self) -> &[WheelState] {
        &self.wheels
    }

    pub fn true_pose(&self) -> &Pose {
        self.truth.pose()
    }

    pub fn estimated_pose(&self) -> &Pose {
        self.odometry.pose()
    }

    pub fn error(&self) -> PoseError {
        evaluate(self.truth.pose(), self.odometry.pose())
    }

    pub fn odometry_stats(&self) -> &OdometryStats {
        self.odometry.stats()
    }

    pub fn bit_step(&self) -> f64 {
        self.odometry.model().bit_step()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Skipped quadrature states across all wheels so far.
    pub fn decoder_faults(&self) -> u64 {
        self.wheels.iter().map(|w| w.decoder().faults()).sum()
    }
}
