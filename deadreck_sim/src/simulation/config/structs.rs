// deadreck_sim/src/simulation/config/structs.rs

use deadreck_core::error::ConfigError;
use deadreck_core::estimation::odometry::{OdometryModel, UnpairedStepPolicy};
use deadreck_core::geometry::{RobotGeometry, WheelCount};
use deadreck_core::models::encoder::EncoderConfig;
use serde::{Deserialize, Serialize};

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file. Every section is
/// optional; missing values fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: Simulation,

    #[serde(default)]
    pub robot: RobotConfig,

    #[serde(default)]
    pub encoder: EncoderSettings,

    #[serde(default)]
    pub odometry: OdometrySettings,

    // The TOML has `[[segments]]`, which becomes a Vec of Segment values.
    #[serde(default = "default_segments")]
    pub segments: Vec<Segment>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            simulation: Simulation::default(),
            robot: RobotConfig::default(),
            encoder: EncoderSettings::default(),
            odometry: OdometrySettings::default(),
            segments: default_segments(),
        }
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// These map directly to the sections in the scenario file.
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Optional seed for the pseudo-random number generator for determinism.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Fixed tick frequency in Hz.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: f64,
    /// Record a trajectory point every N ticks (segment ends are always recorded).
    #[serde(default = "default_record_every")]
    pub record_every: u32,
}

fn default_tick_rate() -> f64 {
    400.0
}

fn default_record_every() -> u32 {
    40
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            tick_rate_hz: default_tick_rate(),
            record_every: default_record_every(),
        }
    }
}

impl Simulation {
    pub fn tick_duration(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }
}

/// Chassis dimensions, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RobotConfig {
    pub wheel_radius: f64,
    pub track_width: f64,
    #[serde(default)]
    pub wheelbase: f64,
    /// Either 2 or 4.
    pub wheels: WheelCount,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            wheel_radius: 0.05,
            track_width: 0.2,
            wheelbase: 0.2,
            wheels: WheelCount::Four,
        }
    }
}

impl RobotConfig {
    pub fn to_geometry(&self) -> Result<RobotGeometry, ConfigError> {
        RobotGeometry::new(
            self.wheel_radius,
            self.track_width,
            self.wheelbase,
            self.wheels,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncoderSettings {
    pub bits_per_revolution: u32,
    /// Angular noise on every read, in radians.
    #[serde(default)]
    pub noise_std: f64,
    #[serde(default = "default_slip_mean")]
    pub slip_mean: f64,
    #[serde(default)]
    pub slip_std: f64,
    #[serde(default = "default_quadrature_phase")]
    pub quadrature_phase: f64,
}

fn default_slip_mean() -> f64 {
    1.0
}

fn default_quadrature_phase() -> f64 {
    EncoderConfig::CANONICAL_PHASE
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            bits_per_revolution: 64,
            noise_std: 0.005,
            slip_mean: default_slip_mean(),
            slip_std: 0.02,
            quadrature_phase: default_quadrature_phase(),
        }
    }
}

impl EncoderSettings {
    /// The same settings with noise and slip switched off.
    pub fn ideal(bits_per_revolution: u32) -> Self {
        Self {
            bits_per_revolution,
            noise_std: 0.0,
            slip_mean: 1.0,
            slip_std: 0.0,
            quadrature_phase: default_quadrature_phase(),
        }
    }

    pub fn to_config(&self) -> Result<EncoderConfig, ConfigError> {
        EncoderConfig::new(self.bits_per_revolution)?
            .with_noise(self.noise_std)?
            .with_slip(self.slip_mean, self.slip_std)?
            .with_phase(self.quadrature_phase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OdometrySettings {
    #[serde(default = "default_jitter_threshold")]
    pub jitter_threshold: f64,
    #[serde(default)]
    pub unpaired_policy: UnpairedStepPolicy,
}

fn default_jitter_threshold() -> f64 {
    OdometryModel::DEFAULT_JITTER_THRESHOLD
}

impl Default for OdometrySettings {
    fn default() -> Self {
        Self {
            jitter_threshold: default_jitter_threshold(),
            unpaired_policy: UnpairedStepPolicy::default(),
        }
    }
}

impl OdometrySettings {
    pub fn to_model(
        &self,
        geometry: &RobotGeometry,
        encoder: &EncoderConfig,
    ) -> Result<OdometryModel, ConfigError> {
        OdometryModel::new(geometry, encoder).with_jitter_threshold(self.jitter_threshold)
    }
}

// =========================================================================
// == Command Segments ==
// =========================================================================

/// One scripted manoeuvre. Negative distances drive backwards and negative
/// angles turn clockwise; speeds and rates are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")] // This tells serde to use the "type" field to decide which enum variant to parse
#[serde(rename_all = "PascalCase")] // e.g., "Drive" in TOML maps to `Drive` variant
pub enum Segment {
    Drive {
        /// Meters.
        distance: f64,
        /// Meters per second.
        #[serde(default = "default_drive_speed")]
        speed: f64,
    },
    Turn {
        angle_deg: f64,
        /// Degrees per second.
        #[serde(default = "default_turn_rate")]
        rate_deg: f64,
    },
    Wait {
        /// Seconds.
        duration: f64,
    },
}

fn default_drive_speed() -> f64 {
    0.3
}

fn default_turn_rate() -> f64 {
    50.0
}

impl Segment {
    pub fn drive(distance: f64) -> Self {
        Segment::Drive {
            distance,
            speed: default_drive_speed(),
        }
    }

    pub fn turn(angle_deg: f64) -> Self {
        Segment::Turn {
            angle_deg,
            rate_deg: default_turn_rate(),
        }
    }

    /// How long the segment holds its command, in seconds.
    pub fn duration(&self) -> f64 {
        match *self {
            Segment::Drive { distance, speed } => distance.abs() / speed,
            Segment::Turn { angle_deg, rate_deg } => angle_deg.abs() / rate_deg,
            Segment::Wait { duration } => duration,
        }
    }

    pub fn get_type_str(&self) -> &str {
        match self {
            Segment::Drive { .. } => "Drive",
            Segment::Turn { .. } => "Turn",
            Segment::Wait { .. } => "Wait",
        }
    }
}

/// Forward 1 m, turn 45°, forward 2 m, turn -90°, forward 1.5 m.
fn default_segments() -> Vec<Segment> {
    vec![
        Segment::drive(1.0),
        Segment::turn(45.0),
        Segment::drive(2.0),
        Segment::turn(-90.0),
        Segment::drive(1.5),
    ]
}
