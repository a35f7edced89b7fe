// deadreck_sim/src/simulation/config/mod.rs

//! Loading, layering and validating scenario configuration.
//!
//! Values are resolved in three layers: built-in defaults, then the scenario
//! file (if any), then command-line overrides.

pub mod structs;

use std::path::Path;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use tracing::info;

use crate::error::SimError;
pub use structs::{
    EncoderSettings, OdometrySettings, RobotConfig, ScenarioConfig, Segment, Simulation,
};

/// Loads a scenario from `path` on top of the defaults. With no path the
/// built-in scenario is used as-is. `seed` overrides whatever the file says.
pub fn load_scenario(path: Option<&Path>, seed: Option<u64>) -> Result<ScenarioConfig, SimError> {
    let mut figment = Figment::from(Serialized::defaults(ScenarioConfig::default()));

    if let Some(path) = path {
        if !path.exists() {
            return Err(SimError::MissingScenario(path.to_path_buf()));
        }
        info!("Loading scenario from: {}", path.display());
        figment = figment.merge(Toml::file(path));
    }

    resolve(figment, seed)
}

/// Same as [`load_scenario`] but reads the TOML from a string.
pub fn parse_scenario(toml: &str, seed: Option<u64>) -> Result<ScenarioConfig, SimError> {
    let figment =
        Figment::from(Serialized::defaults(ScenarioConfig::default())).merge(Toml::string(toml));
    resolve(figment, seed)
}

fn resolve(mut figment: Figment, seed: Option<u64>) -> Result<ScenarioConfig, SimError> {
    if let Some(seed) = seed {
        figment = figment.merge(Serialized::default("simulation.seed", seed));
    }

    let config: ScenarioConfig = figment.extract()?;
    validate(&config)?;
    Ok(config)
}

/// Longest segment accepted, in ticks.
pub const MAX_SEGMENT_TICKS: u64 = 100_000_000;

/// Checks the settings that the core types cannot check for themselves.
/// Robot and encoder values are validated when they are converted.
pub fn validate(config: &ScenarioConfig) -> Result<(), SimError> {
    let sim = &config.simulation;
    if !(sim.tick_rate_hz.is_finite() && sim.tick_rate_hz > 0.0) {
        return Err(SimError::Settings(format!(
            "tick_rate_hz must be positive, got {}",
            sim.tick_rate_hz
        )));
    }
    if sim.record_every == 0 {
        return Err(SimError::Settings("record_every must be at least 1".into()));
    }

    for (i, segment) in config.segments.iter().enumerate() {
        let problem = match *segment {
            Segment::Drive { distance, speed }
                if !(distance.is_finite() && speed.is_finite() && speed > 0.0) =>
            {
                Some(format!("distance {distance} at speed {speed}"))
            }
            Segment::Turn { angle_deg, rate_deg }
                if !(angle_deg.is_finite() && rate_deg.is_finite() && rate_deg > 0.0) =>
            {
                Some(format!("angle {angle_deg} at rate {rate_deg}"))
            }
            Segment::Wait { duration } if !(duration.is_finite() && duration >= 0.0) => {
                Some(format!("duration {duration}"))
            }
            _ => None,
        };
        if let Some(problem) = problem {
            return Err(SimError::Settings(format!(
                "segment {i} ({}) has {problem}",
                segment.get_type_str()
            )));
        }

        let ticks = segment.duration() * sim.tick_rate_hz;
        if ticks > MAX_SEGMENT_TICKS as f64 {
            return Err(SimError::Settings(format!(
                "segment {i} ({}) lasts {:.0} ticks, more than {MAX_SEGMENT_TICKS}",
                segment.get_type_str(),
                ticks
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadreck_core::estimation::odometry::UnpairedStepPolicy;
    use deadreck_core::geometry::WheelCount;

    #[test]
    fn test_empty_file_resolves_to_defaults() {
        let config = parse_scenario("", None).unwrap();
        assert_eq!(config, ScenarioConfig::default());
        assert_eq!(config.segments.len(), 5);
        assert_eq!(config.robot.wheels, WheelCount::Four);
    }

    #[test]
    fn test_file_values_override_defaults() {
        let toml = r#"
            [simulation]
            seed = 7
            tick_rate_hz = 100.0

            [robot]
            wheel_radius = 2.0
            track_width = 20.0
            wheels = 2

            [encoder]
            bits_per_revolution = 2

            [odometry.unpaired_policy]
            type = "Discard"

            [[segments]]
            type = "Drive"
            distance = 100.0
            speed = 10.0

            [[segments]]
            type = "Turn"
            angle_deg = 90.0
        "#;
        let config = parse_scenario(toml, None).unwrap();

        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.tick_rate_hz, 100.0);
        // Untouched fields keep their defaults.
        assert_eq!(config.simulation.record_every, 40);
        assert_eq!(config.robot.wheels, WheelCount::Two);
        assert_eq!(config.encoder.bits_per_revolution, 2);
        assert_eq!(config.encoder.slip_mean, 1.0);
        assert_eq!(config.odometry.unpaired_policy, UnpairedStepPolicy::Discard);
        // Segment lists replace the default list rather than extending it.
        assert_eq!(
            config.segments,
            vec![
                Segment::Drive { distance: 100.0, speed: 10.0 },
                Segment::turn(90.0),
            ]
        );
    }

    #[test]
    fn test_seed_override_wins_over_file() {
        let config = parse_scenario("[simulation]\nseed = 7\n", Some(99)).unwrap();
        assert_eq!(config.simulation.seed, Some(99));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = parse_scenario("[robot]\nwheel_radius = 0.05\nwings = 2\n", None).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn test_invalid_wheel_count_is_rejected() {
        let err = parse_scenario("[robot]\nwheels = 3\n", None).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn test_non_positive_speed_is_rejected() {
        let toml = "[[segments]]\ntype = \"Drive\"\ndistance = 1.0\nspeed = 0.0\n";
        let err = parse_scenario(toml, None).unwrap_err();
        assert!(matches!(err, SimError::Settings(_)));
    }

    #[test]
    fn test_endless_segment_is_rejected() {
        let toml = "[[segments]]\ntype = \"Drive\"\ndistance = 1e9\nspeed = 1e-9\n";
        let err = parse_scenario(toml, None).unwrap_err();
        assert!(matches!(err, SimError::Settings(_)));

        // A long but bounded wait is fine.
        let toml = "[[segments]]\ntype = \"Wait\"\nduration = 3600.0\n";
        assert!(parse_scenario(toml, None).is_ok());
    }

    #[test]
    fn test_zero_tick_rate_is_rejected() {
        let err = parse_scenario("[simulation]\ntick_rate_hz = 0.0\n", None).unwrap_err();
        assert!(matches!(err, SimError::Settings(_)));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_scenario(Some(Path::new("does/not/exist.toml")), None).unwrap_err();
        assert!(matches!(err, SimError::MissingScenario(_)));
    }

    #[test]
    fn test_defaults_render_as_toml() {
        let rendered = toml::to_string_pretty(&ScenarioConfig::default()).unwrap();
        assert!(rendered.contains("[[segments]]"));
        assert!(rendered.contains("type = \"Hold\""));
    }

    #[test]
    fn test_shipped_scenarios_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");

        let square = load_scenario(Some(&dir.join("square.toml")), None).unwrap();
        assert_eq!(square.segments.len(), 8);
        assert_eq!(square.simulation.seed, Some(42));

        let coarse = load_scenario(Some(&dir.join("coarse_encoder.toml")), Some(3)).unwrap();
        assert_eq!(coarse.robot.wheels, WheelCount::Two);
        assert_eq!(coarse.encoder.bits_per_revolution, 2);
        assert_eq!(coarse.simulation.seed, Some(3));
    }
}
