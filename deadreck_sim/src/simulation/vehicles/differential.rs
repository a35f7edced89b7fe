// deadreck_sim/src/simulation/vehicles/differential.rs

use deadreck_core::geometry::{RobotGeometry, Side};
use deadreck_core::types::{Command, Pose};

/// Below this yaw rate a tick is integrated as a straight line.
const STRAIGHT_LINE_EPSILON: f64 = 1e-12;

/// The ground-truth chassis. It follows commands exactly; every imperfection
/// lives in the encoders.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialDriveTruth {
    geometry: RobotGeometry,
    pose: Pose,
}

impl DifferentialDriveTruth {
    pub fn new(geometry: RobotGeometry, initial_pose: Pose) -> Self {
        Self {
            geometry,
            pose: initial_pose,
        }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn geometry(&self) -> &RobotGeometry {
        &self.geometry
    }

    /// Wheel rotation, in radians, that `command` produces over `dt`, in
    /// `WheelPosition` order.
    pub fn wheel_deltas(&self, command: Command, dt: f64) -> Vec<f64> {
        let half_track = self.geometry.track_width() / 2.0;
        let left = (command.linear_speed - command.angular_speed * half_track) * dt;
        let right = (command.linear_speed + command.angular_speed * half_track) * dt;

        self.geometry
            .wheels()
            .positions()
            .iter()
            .map(|position| match position.side() {
                Side::Left => self.geometry.wheel_angle(left),
                Side::Right => self.geometry.wheel_angle(right),
            })
            .collect()
    }

    /// Moves the chassis along the exact arc for one tick and returns the
    /// wheel rotations that produced it.
    pub fn advance(&mut self, command: Command, dt: f64) -> Vec<f64> {
        let deltas = self.wheel_deltas(command, dt);

        let Command {
            linear_speed: v,
            angular_speed: omega,
        } = command;
        let theta = self.pose.theta;
        let dtheta = omega * dt;

        let (dx, dy) = if omega.abs() < STRAIGHT_LINE_EPSILON {
            (v * dt * theta.cos(), v * dt * theta.sin())
        } else {
            let radius = v / omega;
            (
                radius * ((theta + dtheta).sin() - theta.sin()),
                -radius * ((theta + dtheta).cos() - theta.cos()),
            )
        };

        self.pose = Pose::new(self.pose.x + dx, self.pose.y + dy, theta + dtheta);
        deltas
    }
}
