// deadreck_core/src/estimation/evaluation.rs

use serde::Serialize;
use std::f64::consts::TAU;

use crate::types::Pose;

/// Drift of an estimate relative to the ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PoseError {
    /// Euclidean distance between the two positions.
    pub position: f64,
    /// Smallest absolute heading difference, in radians, within `[0, π]`.
    pub angle: f64,
}

impl PoseError {
    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }
}

/// Compares an estimate against the true pose. Purely diagnostic: nothing
/// computed here is ever fed back into the estimator.
pub fn evaluate(true_pose: &Pose, estimated_pose: &Pose) -> PoseError {
    let position = (true_pose.position() - estimated_pose.position()).norm();

    let wrapped = (true_pose.theta - estimated_pose.theta).abs() % TAU;
    let angle = wrapped.min(TAU - wrapped);

    PoseError { position, angle }
}
