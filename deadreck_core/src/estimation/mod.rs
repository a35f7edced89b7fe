// deadreck_core/src/estimation/mod.rs

//! Pose estimation from decoded encoder data, and the diagnostics used to
//! judge it against the ground truth.

pub mod evaluation;
pub mod odometry;
