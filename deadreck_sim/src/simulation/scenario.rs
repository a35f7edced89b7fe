// deadreck_sim/src/simulation/scenario.rs

use deadreck_core::estimation::evaluation::PoseError;
use deadreck_core::estimation::odometry::OdometryStats;
use deadreck_core::types::{Command, Pose};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::SimError;
use crate::simulation::config::{validate, ScenarioConfig, Segment};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::robot::{SimulatedRobot, TickReport};

/// Remainders shorter than this do not get a tick of their own.
const MIN_REMAINDER: f64 = 1e-12;

/// A sampled point of the run, for plotting truth against estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    pub time: f64,
    pub true_pose: Pose,
    pub estimated_pose: Pose,
}

impl From<&TickReport> for TrajectoryPoint {
    fn from(report: &TickReport) -> Self {
        Self {
            time: report.time,
            true_pose: report.true_pose,
            estimated_pose: report.estimated_pose,
        }
    }
}

/// Summary of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub seed: Option<u64>,
    pub ticks: u64,
    pub duration: f64,
    pub final_true_pose: Pose,
    pub final_estimated_pose: Pose,
    pub final_error: PoseError,
    pub max_position_error: f64,
    pub max_angle_error: f64,
    pub decoder_faults: u64,
    pub odometry: OdometryStats,
    pub trajectory: Vec<TrajectoryPoint>,
}

/// Converts a segment into the command to hold and how long to hold it.
pub fn segment_command(segment: &Segment) -> (Command, f64) {
    let command = match *segment {
        Segment::Drive { distance, speed } => Command::drive(speed.copysign(distance)),
        Segment::Turn { angle_deg, rate_deg } => {
            Command::turn(rate_deg.to_radians().copysign(angle_deg))
        }
        Segment::Wait { .. } => Command::stop(),
    };
    (command, segment.duration())
}

/// Drives a [`SimulatedRobot`] through the scripted segments at a fixed tick.
#[derive(Debug)]
pub struct ScenarioRunner {
    config: ScenarioConfig,
    robot: SimulatedRobot,
    rng: SimulationRng,
    dt: f64,
    ticks: u64,
    max_error: PoseError,
    trajectory: Vec<TrajectoryPoint>,
}

impl ScenarioRunner {
    pub fn new(config: ScenarioConfig) -> Result<Self, SimError> {
        validate(&config)?;
        let robot = SimulatedRobot::from_config(&config)?;
        let rng = SimulationRng::from_seed_option(config.simulation.seed)?;
        let dt = config.simulation.tick_duration();

        let trajectory = vec![TrajectoryPoint {
            time: 0.0,
            true_pose: *robot.true_pose(),
            estimated_pose: *robot.estimated_pose(),
        }];

        Ok(Self {
            config,
            robot,
            rng,
            dt,
            ticks: 0,
            max_error: PoseError::default(),
            trajectory,
        })
    }

    pub fn robot(&self) -> &SimulatedRobot {
        &self.robot
    }

    /// Runs every segment in order and returns the summary.
    pub fn run(mut self) -> RunReport {
        info!(
            "Running {} segments at {} Hz",
            self.config.segments.len(),
            self.config.simulation.tick_rate_hz
        );

        let segments = self.config.segments.clone();
        for (i, segment) in segments.iter().enumerate() {
            self.run_segment(i, segment);
        }

        self.report()
    }

    /// Runs one segment as whole ticks followed by a single shorter tick for
    /// whatever duration is left over.
    pub fn run_segment(&mut self, index: usize, segment: &Segment) {
        let (command, duration) = segment_command(segment);
        let full_ticks = (duration / self.dt).floor() as u64;
        let remainder = duration - full_ticks as f64 * self.dt;

        debug!(
            index,
            kind = segment.get_type_str(),
            duration,
            full_ticks,
            remainder,
            "Starting segment"
        );

        let mut last = None;
        for _ in 0..full_ticks {
            last = Some(self.tick(command, self.dt));
        }
        if remainder > MIN_REMAINDER {
            last = Some(self.tick(command, remainder));
        }

        if let Some(report) = last {
            // Segment ends are always recorded.
            if self.trajectory.last().map(|p| p.time) != Some(report.time) {
                self.trajectory.push(TrajectoryPoint::from(&report));
            }
            info!(
                "Segment {} ({}) done | Pos Err: {:.3} | Att Err: {:.3}°",
                index,
                segment.get_type_str(),
                report.error.position,
                report.error.angle_degrees()
            );
        }
    }

    fn tick(&mut self, command: Command, dt: f64) -> TickReport {
        let report = self.robot.step(command, dt, &mut self.rng.0);
        self.ticks += 1;

        self.max_error.position = self.max_error.position.max(report.error.position);
        self.max_error.angle = self.max_error.angle.max(report.error.angle);

        if self.ticks % u64::from(self.config.simulation.record_every) == 0 {
            self.trajectory.push(TrajectoryPoint::from(&report));
        }
        report
    }

    fn report(self) -> RunReport {
        let robot = &self.robot;
        RunReport {
            seed: self.config.simulation.seed,
            ticks: self.ticks,
            duration: robot.elapsed(),
            final_true_pose: *robot.true_pose(),
            final_estimated_pose: *robot.estimated_pose(),
            final_error: robot.error(),
            max_position_error: self.max_error.position,
            max_angle_error: self.max_error.angle,
            decoder_faults: robot.decoder_faults(),
            odometry: *robot.odometry_stats(),
            trajectory: self.trajectory,
        }
    }
}
