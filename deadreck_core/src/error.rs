// deadreck_core/src/error.rs

use thiserror::Error;

/// Construction-time failures. Once a geometry, encoder configuration or
/// integrator has been built, the per-tick pipeline cannot fail.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("wheel radius must be positive and finite, got {0}")]
    WheelRadius(f64),

    #[error("track width must be positive and finite, got {0}")]
    TrackWidth(f64),

    #[error("wheelbase must be positive and finite for a four-wheel robot, got {0}")]
    Wheelbase(f64),

    #[error("unsupported wheel count {0} (expected 2 or 4)")]
    WheelCount(usize),

    #[error("encoder resolution must be at least one bit per revolution, got {0}")]
    Resolution(u32),

    #[error("{name} must be a finite, non-negative standard deviation, got {value}")]
    StdDev { name: &'static str, value: f64 },

    #[error("slip mean must be positive and finite, got {0}")]
    SlipMean(f64),

    #[error("quadrature phase must lie in (0, 2) and differ from 1, got {0}")]
    QuadraturePhase(f64),

    #[error("jitter threshold must lie in [0, 1], got {0}")]
    JitterThreshold(f64),
}
