// deadreck_sim/src/error.rs

use std::path::PathBuf;

use deadreck_core::error::ConfigError;
use thiserror::Error;

/// Everything that can stop a simulation run before it starts, or stop its
/// results from being written. Ticks themselves never fail.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("scenario file {0} does not exist")]
    MissingScenario(PathBuf),

    #[error("failed to load or parse scenario: {0}")]
    Config(#[from] figment::Error),

    #[error("invalid robot or encoder configuration: {0}")]
    Invalid(#[from] ConfigError),

    #[error("invalid simulation settings: {0}")]
    Settings(String),

    #[error("invalid noise distribution: {0}")]
    Distribution(#[from] rand_distr::NormalError),

    #[error("failed to seed the random number generator: {0}")]
    Entropy(#[from] rand::Error),

    #[error("failed to render scenario as TOML: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("failed to write trajectory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize trajectory: {0}")]
    Json(#[from] serde_json::Error),
}
