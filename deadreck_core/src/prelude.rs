// deadreck_core/src/prelude.rs

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::error::ConfigError;
pub use crate::geometry::{RobotGeometry, Side, WheelCount, WheelPosition};
pub use crate::types::{normalize_angle, Command, Pose};

// --- Sensor Models ---
pub use crate::models::encoder::{BitPair, EncoderConfig};
pub use crate::models::quadrature::{decode, Direction, QuadratureDecoder};
pub use crate::models::wheel::WheelState;

// --- Estimation Algorithms ---
pub use crate::estimation::evaluation::{evaluate, PoseError};
pub use crate::estimation::odometry::{
    integrate, Motion, OdometryIntegrator, OdometryModel, OdometryStats, SideSteps,
    UnpairedStepPolicy,
};
