// deadreck_core/src/estimation/odometry.rs

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::geometry::RobotGeometry;
use crate::models::encoder::EncoderConfig;
use crate::models::quadrature::Direction;
use crate::types::Pose;

// =========================================================================
// == Per-Tick Motion Classification ==
// =========================================================================

/// Decoded motion of each chassis side, in Gray transitions.
///
/// Wheels are read in `WheelPosition` order, so even indices are left wheels
/// and odd indices are right wheels. With two wheels per side the values are
/// averages and can be half steps.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SideSteps {
    pub left: f64,
    pub right: f64,
}

impl SideSteps {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

/// How one tick's decoded steps are interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Stationary,
    /// Both sides agree; signed distance along the heading.
    Straight { distance: f64 },
    /// Sides disagree in sign; signed counter-clockwise heading change.
    Rotation { angle: f64 },
    /// Only one side moved. Low confidence: no net motion.
    Unpaired,
}

/// The stateless kinematic rule: converts decoded directions into a pose
/// increment for a given chassis and encoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdometryModel {
    bit_step: f64,
    turning_radius: f64,
    jitter_threshold: f64,
}

impl OdometryModel {
    /// Side averages smaller than this are treated as jitter.
    pub const DEFAULT_JITTER_THRESHOLD: f64 = 0.5;

    pub fn new(geometry: &RobotGeometry, encoder: &EncoderConfig) -> Self {
        Self {
            bit_step: geometry.wheel_radius() * encoder.transition_angle(),
            turning_radius: geometry.turning_radius(),
            jitter_threshold: Self::DEFAULT_JITTER_THRESHOLD,
        }
    }

    pub fn with_jitter_threshold(mut self, threshold: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::JitterThreshold(threshold));
        }
        self.jitter_threshold = threshold;
        Ok(self)
    }

    /// Linear wheel travel represented by one Gray transition.
    pub fn bit_step(&self) -> f64 {
        self.bit_step
    }

    /// Heading change represented by one opposed pair of transitions.
    pub fn rotation_step(&self) -> f64 {
        self.bit_step / self.turning_radius
    }

    pub fn jitter_threshold(&self) -> f64 {
        self.jitter_threshold
    }

    /// Averages each side's decoded steps and suppresses sub-threshold jitter.
    pub fn side_steps(&self, directions: &[Direction]) -> SideSteps {
        let (mut left_sum, mut left_n, mut right_sum, mut right_n) = (0.0, 0u32, 0.0, 0u32);
        for (i, direction) in directions.iter().enumerate() {
            let steps = f64::from(direction.steps());
            if i % 2 == 0 {
                left_sum += steps;
                left_n += 1;
            } else {
                right_sum += steps;
                right_n += 1;
            }
        }

        let mean = |sum: f64, n: u32| if n == 0 { 0.0 } else { sum / f64::from(n) };
        let suppress = |value: f64| {
            if value.abs() < self.jitter_threshold {
                0.0
            } else {
                value
            }
        };

        SideSteps {
            left: suppress(mean(left_sum, left_n)),
            right: suppress(mean(right_sum, right_n)),
        }
    }

    /// Straight travel when both sides agree, in-place rotation when they
    /// disagree, nothing when only one side moved.
    pub fn classify(&self, steps: SideSteps) -> Motion {
        let SideSteps { left, right } = steps;
        let product = left * right;
        if steps.is_zero() {
            Motion::Stationary
        } else if product > 0.0 {
            let paired = left.abs().min(right.abs());
            Motion::Straight {
                distance: self.bit_step * paired * left.signum(),
            }
        } else if product < 0.0 {
            // Left backward with right forward turns counter-clockwise.
            let paired = left.abs().min(right.abs());
            Motion::Rotation {
                angle: self.rotation_step() * paired * right.signum(),
            }
        } else {
            Motion::Unpaired
        }
    }

    /// Applies a classified motion to `pose`. Heading is only ever changed by
    /// accumulation and is re-normalized afterwards.
    pub fn apply(&self, motion: Motion, pose: &mut Pose) {
        match motion {
            Motion::Straight { distance } => pose.advance(distance),
            Motion::Rotation { angle } => pose.rotate(angle),
            Motion::Stationary | Motion::Unpaired => {}
        }
    }

    /// Standard differential-drive arc update, using the mid-tick heading.
    pub fn apply_arc(&self, steps: SideSteps, pose: &mut Pose) {
        let distance = self.bit_step * (steps.left + steps.right) / 2.0;
        let angle = self.rotation_step() * (steps.right - steps.left) / 2.0;
        pose.rotate(angle / 2.0);
        pose.advance(distance);
        pose.rotate(angle / 2.0);
    }
}

/// Single-tick integration without any carried state: one reading per wheel
/// in `WheelPosition` order, applied to `estimated_pose`.
pub fn integrate(
    directions: &[Direction],
    model: &OdometryModel,
    estimated_pose: &mut Pose,
) -> Pose {
    let motion = model.classify(model.side_steps(directions));
    model.apply(motion, estimated_pose);
    *estimated_pose
}

// =========================================================================
// == Stateful Integrator ==
// =========================================================================

/// What to do with a step decoded on one side while the other side is idle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "PascalCase")]
pub enum UnpairedStepPolicy {
    /// Drop it. The tick is no net motion and the step is lost.
    Discard,
    /// Keep it pending until the other side steps too, then apply the pair.
    /// A side may lead by at most `max_lead_steps`; anything beyond is dropped.
    Hold { max_lead_steps: u32 },
    /// Treat every tick as a differential-drive arc, including lone steps.
    Pivot,
}

impl Default for UnpairedStepPolicy {
    fn default() -> Self {
        UnpairedStepPolicy::Hold { max_lead_steps: 1 }
    }
}

/// Running counters, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OdometryStats {
    pub ticks: u64,
    pub uncertain_readings: u64,
    pub straight_updates: u64,
    pub rotation_updates: u64,
    pub unpaired_ticks: u64,
    pub dropped_steps: u64,
}

/// Owns the estimated pose and updates it once per tick from decoded wheel
/// directions. It never sees the true pose.
#[derive(Debug, Clone)]
pub struct OdometryIntegrator {
    model: OdometryModel,
    policy: UnpairedStepPolicy,
    pose: Pose,
    pending: SideSteps,
    stats: OdometryStats,
}

impl OdometryIntegrator {
    pub fn new(model: OdometryModel, policy: UnpairedStepPolicy, initial_pose: Pose) -> Self {
        Self {
            model,
            policy,
            pose: initial_pose,
            pending: SideSteps::default(),
            stats: OdometryStats::default(),
        }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn model(&self) -> &OdometryModel {
        &self.model
    }

    pub fn policy(&self) -> UnpairedStepPolicy {
        self.policy
    }

    pub fn stats(&self) -> &OdometryStats {
        &self.stats
    }

    /// Steps decoded on one side and still waiting for the other side.
    pub fn pending(&self) -> SideSteps {
        self.pending
    }

    /// Consumes one tick of decoded directions and returns the updated pose.
    pub fn process(&mut self, directions: &[Direction]) -> Pose {
        self.stats.ticks += 1;
        self.stats.uncertain_readings +=
            directions.iter().filter(|d| d.is_fault()).count() as u64;

        let steps = self.model.side_steps(directions);
        match self.policy {
            UnpairedStepPolicy::Discard => {
                let motion = self.model.classify(steps);
                if motion == Motion::Unpaired {
                    self.stats.dropped_steps += 1;
                }
                self.apply(motion);
            }
            UnpairedStepPolicy::Hold { max_lead_steps } => {
                self.pending.left += steps.left;
                self.pending.right += steps.right;
                let motion = self.model.classify(self.pending);
                self.apply(motion);
                self.consume(motion);
                self.cap_lead(f64::from(max_lead_steps));
            }
            UnpairedStepPolicy::Pivot => {
                if !steps.is_zero() {
                    self.count(self.model.classify(steps));
                    self.model.apply_arc(steps, &mut self.pose);
                }
            }
        }

        self.pose
    }

    fn apply(&mut self, motion: Motion) {
        self.count(motion);
        self.model.apply(motion, &mut self.pose);
    }

    fn count(&mut self, motion: Motion) {
        match motion {
            Motion::Straight { .. } => self.stats.straight_updates += 1,
            Motion::Rotation { .. } => self.stats.rotation_updates += 1,
            Motion::Unpaired => self.stats.unpaired_ticks += 1,
            Motion::Stationary => {}
        }
    }

    /// Removes the paired part of the pending steps once it has been applied.
    fn consume(&mut self, motion: Motion) {
        if matches!(motion, Motion::Straight { .. } | Motion::Rotation { .. }) {
            let paired = self.pending.left.abs().min(self.pending.right.abs());
            self.pending.left -= paired * self.pending.left.signum();
            self.pending.right -= paired * self.pending.right.signum();
        }
    }

    fn cap_lead(&mut self, max_lead: f64) {
        for (side, pending) in [("left", &mut self.pending.left), ("right", &mut self.pending.right)] {
            let excess = pending.abs() - max_lead;
            if excess > 0.0 {
                debug!(side, excess, "Dropping unpaired odometry steps");
                *pending = max_lead * pending.signum();
                self.stats.dropped_steps += excess.ceil() as u64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPSILON: f64 = 1e-9;
    const F: Direction = Direction::Forward;
    const B: Direction = Direction::Backward;
    const N: Direction = Direction::None;
    const U: Direction = Direction::Uncertain;

    /// r = 2, two bits per revolution, 20 wide: bit_step = π, rotation step = π/10.
    fn model() -> OdometryModel {
        let geometry = RobotGeometry::differential(2.0, 20.0).unwrap();
        let encoder = EncoderConfig::new(2).unwrap();
        OdometryModel::new(&geometry, &encoder)
    }

    fn integrator(policy: UnpairedStepPolicy) -> OdometryIntegrator {
        OdometryIntegrator::new(model(), policy, Pose::origin())
    }

    #[test]
    fn test_model_steps() {
        let model = model();
        assert_abs_diff_eq!(model.bit_step(), PI, epsilon = EPSILON);
        assert_abs_diff_eq!(model.rotation_step(), PI / 10.0, epsilon = EPSILON);
        assert!(model.with_jitter_threshold(1.5).is_err());
    }

    #[test]
    fn test_classify_two_wheel_rules() {
        let model = model();
        let classify = |dirs: [Direction; 2]| model.classify(model.side_steps(&dirs));

        assert_eq!(classify([N, N]), Motion::Stationary);
        assert_eq!(classify([F, F]), Motion::Straight { distance: PI });
        assert_eq!(classify([B, B]), Motion::Straight { distance: -PI });
        assert_eq!(classify([B, F]), Motion::Rotation { angle: PI / 10.0 });
        assert_eq!(classify([F, B]), Motion::Rotation { angle: -PI / 10.0 });
        assert_eq!(classify([F, N]), Motion::Unpaired);
        assert_eq!(classify([N, B]), Motion::Unpaired);
        // Uncertain counts as no motion for that wheel.
        assert_eq!(classify([U, F]), Motion::Unpaired);
        assert_eq!(classify([U, U]), Motion::Stationary);
    }

    #[test]
    fn test_four_wheel_averages_sides() {
        let model = model();
        // FL, FR, RL, RR
        assert_eq!(model.side_steps(&[F, F, F, F]), SideSteps::new(1.0, 1.0));
        assert_eq!(model.side_steps(&[F, B, N, B]), SideSteps::new(0.5, -1.0));
        assert_eq!(model.side_steps(&[F, N, B, N]), SideSteps::new(0.0, 0.0));
        assert_eq!(
            model.classify(model.side_steps(&[B, F, B, F])),
            Motion::Rotation { angle: PI / 10.0 }
        );
        assert_eq!(
            model.classify(model.side_steps(&[F, F, N, F])),
            Motion::Straight { distance: PI / 2.0 }
        );
    }

    #[test]
    fn test_jitter_threshold_suppresses_half_steps() {
        let model = model().with_jitter_threshold(0.75).unwrap();
        assert_eq!(model.side_steps(&[F, F, N, F]), SideSteps::new(0.0, 1.0));
    }

    #[test]
    fn test_integrate_straight_uses_estimated_heading() {
        let model = model();
        let mut pose = Pose::new(0.0, 0.0, FRAC_PI_2);
        let updated = integrate(&[F, F], &model, &mut pose);
        assert_eq!(updated, pose);
        assert_abs_diff_eq!(pose.x, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(pose.y, PI, epsilon = EPSILON);
        assert_abs_diff_eq!(pose.theta, FRAC_PI_2, epsilon = EPSILON);
    }

    #[test]
    fn test_integrate_unpaired_is_no_motion() {
        let model = model();
        let mut pose = Pose::new(1.0, 2.0, 0.5);
        integrate(&[F, N], &model, &mut pose);
        assert_eq!(pose, Pose::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn test_heading_stays_normalized_under_rotation() {
        let model = model();
        let mut pose = Pose::origin();
        for _ in 0..100 {
            integrate(&[B, F], &model, &mut pose);
            assert!(pose.theta > -PI && pose.theta <= PI);
        }
        for _ in 0..237 {
            integrate(&[F, B], &model, &mut pose);
            assert!(pose.theta > -PI && pose.theta <= PI);
        }
        assert_eq!(pose.x, 0.0);
        assert_eq!(pose.y, 0.0);
    }

    #[test]
    fn test_discard_policy_loses_lone_steps() {
        let mut odom = integrator(UnpairedStepPolicy::Discard);
        odom.process(&[B, N]);
        odom.process(&[N, F]);
        assert_eq!(*odom.pose(), Pose::origin());
        assert_eq!(odom.stats().dropped_steps, 2);
    }

    #[test]
    fn test_hold_policy_pairs_steps_across_ticks() {
        let mut odom = integrator(UnpairedStepPolicy::default());

        // Left reaches its transition first, right one tick later.
        odom.process(&[B, N]);
        assert_eq!(*odom.pose(), Pose::origin());
        assert_eq!(odom.pending(), SideSteps::new(-1.0, 0.0));

        odom.process(&[N, F]);
        assert_abs_diff_eq!(odom.pose().theta, PI / 10.0, epsilon = EPSILON);
        assert!(odom.pending().is_zero());
        assert_eq!(odom.stats().rotation_updates, 1);
        assert_eq!(odom.stats().dropped_steps, 0);
    }

    #[test]
    fn test_hold_policy_jitter_cancels() {
        let mut odom = integrator(UnpairedStepPolicy::default());
        odom.process(&[F, N]);
        odom.process(&[B, N]);
        assert!(odom.pending().is_zero());
        odom.process(&[F, F]);
        assert_abs_diff_eq!(odom.pose().x, PI, epsilon = EPSILON);
    }

    #[test]
    fn test_hold_policy_caps_lead() {
        let mut odom = integrator(UnpairedStepPolicy::Hold { max_lead_steps: 1 });
        for _ in 0..3 {
            odom.process(&[F, N]);
        }
        assert_eq!(odom.pending(), SideSteps::new(1.0, 0.0));
        assert_eq!(odom.stats().dropped_steps, 2);
        assert_eq!(*odom.pose(), Pose::origin());
    }

    #[test]
    fn test_pivot_policy_applies_arc() {
        let mut odom = integrator(UnpairedStepPolicy::Pivot);
        odom.process(&[N, F]);
        let pose = odom.pose();
        // Heading changes by half a rotation step, centre moves half a bit step.
        assert_abs_diff_eq!(pose.theta, PI / 20.0, epsilon = EPSILON);
        assert_abs_diff_eq!(pose.position().norm(), PI / 2.0, epsilon = EPSILON);

        let mut odom = integrator(UnpairedStepPolicy::Pivot);
        odom.process(&[F, F]);
        assert_abs_diff_eq!(odom.pose().x, PI, epsilon = EPSILON);
        assert_abs_diff_eq!(odom.pose().theta, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_round_trip_returns_to_start() {
        let mut odom = integrator(UnpairedStepPolicy::default());
        for _ in 0..25 {
            odom.process(&[F, F]);
        }
        for _ in 0..25 {
            odom.process(&[B, B]);
        }
        assert_abs_diff_eq!(odom.pose().x, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(odom.pose().y, 0.0, epsilon = EPSILON);
        assert_eq!(odom.pose().theta, 0.0);
    }

    #[test]
    fn test_uncertain_readings_are_counted() {
        let mut odom = integrator(UnpairedStepPolicy::Discard);
        odom.process(&[U, F]);
        odom.process(&[U, U]);
        assert_eq!(odom.stats().uncertain_readings, 3);
        assert_eq!(odom.stats().ticks, 2);
        assert_eq!(*odom.pose(), Pose::origin());
    }
}
