// deadreck_core/src/geometry.rs

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which side of the chassis a wheel is mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Mounting position of a wheel. The discriminant is the wheel's index in every
/// per-wheel array of the workspace: a two-wheel robot only uses the front pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelPosition {
    FrontLeft = 0,
    FrontRight = 1,
    RearLeft = 2,
    RearRight = 3,
}

impl WheelPosition {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn side(self) -> Side {
        match self {
            WheelPosition::FrontLeft | WheelPosition::RearLeft => Side::Left,
            WheelPosition::FrontRight | WheelPosition::RearRight => Side::Right,
        }
    }
}

/// Number of encoder-equipped wheels. Fixed for the lifetime of a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum WheelCount {
    #[default]
    Two,
    Four,
}

impl WheelCount {
    pub fn count(self) -> usize {
        self.positions().len()
    }

    pub fn positions(self) -> &'static [WheelPosition] {
        use WheelPosition::*;
        match self {
            WheelCount::Two => &[FrontLeft, FrontRight],
            WheelCount::Four => &[FrontLeft, FrontRight, RearLeft, RearRight],
        }
    }
}

impl TryFrom<usize> for WheelCount {
    type Error = ConfigError;

    fn try_from(count: usize) -> Result<Self, Self::Error> {
        match count {
            2 => Ok(WheelCount::Two),
            4 => Ok(WheelCount::Four),
            other => Err(ConfigError::WheelCount(other)),
        }
    }
}

impl From<WheelCount> for usize {
    fn from(wheels: WheelCount) -> Self {
        wheels.count()
    }
}

// =========================================================================
// == Robot Geometry ==
// =========================================================================

/// Immutable chassis dimensions. All lengths share one unit (the unit of the
/// resulting pose); only construction can fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotGeometry {
    wheel_radius: f64,
    track_width: f64,
    wheelbase: f64,
    wheels: WheelCount,
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl RobotGeometry {
    /// Validates and builds a geometry.
    ///
    /// `wheelbase` is only checked for four-wheel robots; a differential-drive
    /// robot may pass `0.0`.
    pub fn new(
        wheel_radius: f64,
        track_width: f64,
        wheelbase: f64,
        wheels: WheelCount,
    ) -> Result<Self, ConfigError> {
        if !positive(wheel_radius) {
            return Err(ConfigError::WheelRadius(wheel_radius));
        }
        if !positive(track_width) {
            return Err(ConfigError::TrackWidth(track_width));
        }
        if wheels == WheelCount::Four && !positive(wheelbase) {
            return Err(ConfigError::Wheelbase(wheelbase));
        }
        Ok(Self {
            wheel_radius,
            track_width,
            wheelbase,
            wheels,
        })
    }

    /// A two-wheel differential-drive robot.
    pub fn differential(wheel_radius: f64, track_width: f64) -> Result<Self, ConfigError> {
        Self::new(wheel_radius, track_width, 0.0, WheelCount::Two)
    }

    /// A four-wheel skid-steer robot.
    pub fn four_wheel(
        wheel_radius: f64,
        track_width: f64,
        wheelbase: f64,
    ) -> Result<Self, ConfigError> {
        Self::new(wheel_radius, track_width, wheelbase, WheelCount::Four)
    }

    pub fn wheel_radius(&self) -> f64 {
        self.wheel_radius
    }

    pub fn track_width(&self) -> f64 {
        self.track_width
    }

    pub fn wheelbase(&self) -> f64 {
        self.wheelbase
    }

    pub fn wheels(&self) -> WheelCount {
        self.wheels
    }

    /// Distance from the rotation centre to each wheel track during an
    /// in-place turn. Four-wheel robots are treated as skid-steer, so the
    /// wheelbase does not enter.
    pub fn turning_radius(&self) -> f64 {
        self.track_width / 2.0
    }

    /// Converts linear travel at the wheel contact into wheel rotation.
    pub fn wheel_angle(&self, distance: f64) -> f64 {
        distance / self.wheel_radius
    }
}
