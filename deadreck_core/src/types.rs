// deadreck_core/src/types.rs

use nalgebra::{Unit, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Wraps an angle into the half-open interval `(-π, π]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

// =========================================================================
// == Pose ==
// =========================================================================

/// A planar pose: position in the world frame and heading about the vertical axis.
///
/// Heading is measured counter-clockwise from the world +X axis and is kept
/// normalized to `(-π, π]` by every constructor and mutator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    pub fn origin() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Unit vector pointing along the current heading.
    pub fn heading(&self) -> Unit<Vector2<f64>> {
        Unit::new_unchecked(Vector2::new(self.theta.cos(), self.theta.sin()))
    }

    /// Moves the pose `distance` along its current heading.
    pub fn advance(&mut self, distance: f64) {
        let step = self.heading().into_inner() * distance;
        self.x += step.x;
        self.y += step.y;
    }

    /// Adds `delta` to the heading and re-normalizes it.
    pub fn rotate(&mut self, delta: f64) {
        self.theta = normalize_angle(self.theta + delta);
    }
}

// =========================================================================
// == Command ==
// =========================================================================

/// The per-tick motion intent handed to the ground-truth model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Command {
    /// Forward speed along the body heading (length units per second).
    pub linear_speed: f64,
    /// Counter-clockwise yaw rate (radians per second).
    pub angular_speed: f64,
}

impl Command {
    pub fn drive(linear_speed: f64) -> Self {
        Self {
            linear_speed,
            angular_speed: 0.0,
        }
    }

    pub fn turn(angular_speed: f64) -> Self {
        Self {
            linear_speed: 0.0,
            angular_speed,
        }
    }

    pub fn stop() -> Self {
        Self::default()
    }

    pub fn is_moving(&self) -> bool {
        self.linear_speed != 0.0
    }

    pub fn is_turning(&self) -> bool {
        self.angular_speed != 0.0
    }
}
