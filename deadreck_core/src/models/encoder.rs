// deadreck_core/src/models/encoder.rs

use std::f64::consts::TAU;

use crate::error::ConfigError;

/// Static description of one incremental quadrature encoder.
///
/// The resolution is expressed in bit periods of channel A per wheel turn.
/// Channel B runs on the same period, shifted by `quadrature_phase` periods,
/// so every bit period holds two Gray-code transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderConfig {
    bits_per_revolution: u32,
    noise_std: f64,
    slip_mean: f64,
    slip_std: f64,
    quadrature_phase: f64,
}

impl EncoderConfig {
    /// Channel B lags channel A by one and a half bit periods.
    pub const CANONICAL_PHASE: f64 = 1.5;

    /// An ideal encoder: no tick noise, no slip, canonical phase.
    pub fn new(bits_per_revolution: u32) -> Result<Self, ConfigError> {
        if bits_per_revolution == 0 {
            return Err(ConfigError::Resolution(bits_per_revolution));
        }
        Ok(Self {
            bits_per_revolution,
            noise_std: 0.0,
            slip_mean: 1.0,
            slip_std: 0.0,
            quadrature_phase: Self::CANONICAL_PHASE,
        })
    }

    /// Additive angular noise (radians, one standard deviation) on every read.
    pub fn with_noise(mut self, noise_std: f64) -> Result<Self, ConfigError> {
        check_std_dev("noise_std", noise_std)?;
        self.noise_std = noise_std;
        Ok(self)
    }

    /// Multiplicative slip applied to each tick's true rotation.
    pub fn with_slip(mut self, slip_mean: f64, slip_std: f64) -> Result<Self, ConfigError> {
        if !(slip_mean.is_finite() && slip_mean > 0.0) {
            return Err(ConfigError::SlipMean(slip_mean));
        }
        check_std_dev("slip_std", slip_std)?;
        self.slip_mean = slip_mean;
        self.slip_std = slip_std;
        Ok(self)
    }

    /// Offset of channel B in bit periods. A phase of exactly 1 puts both
    /// channels' edges on the same angles and is rejected.
    pub fn with_phase(mut self, quadrature_phase: f64) -> Result<Self, ConfigError> {
        let valid = quadrature_phase > 0.0 && quadrature_phase < 2.0 && quadrature_phase != 1.0;
        if !valid {
            return Err(ConfigError::QuadraturePhase(quadrature_phase));
        }
        self.quadrature_phase = quadrature_phase;
        Ok(self)
    }

    pub fn bits_per_revolution(&self) -> u32 {
        self.bits_per_revolution
    }

    pub fn noise_std(&self) -> f64 {
        self.noise_std
    }

    pub fn slip_mean(&self) -> f64 {
        self.slip_mean
    }

    pub fn slip_std(&self) -> f64 {
        self.slip_std
    }

    pub fn quadrature_phase(&self) -> f64 {
        self.quadrature_phase
    }

    /// Wheel angle covered by one bit period of a channel.
    pub fn bit_size(&self) -> f64 {
        TAU / self.bits_per_revolution as f64
    }

    /// Mean wheel angle between two consecutive Gray transitions.
    pub fn transition_angle(&self) -> f64 {
        self.bit_size() / 2.0
    }

    /// Angular offset of channel B relative to channel A.
    ///
    /// Shifting B by one whole bit period inverts it, which reverses the Gray
    /// cycle. Phases below one period are therefore moved up by a period so
    /// that increasing angle always walks the forward cycle.
    pub fn phase_offset(&self) -> f64 {
        let lag = if self.quadrature_phase < 1.0 {
            self.quadrature_phase + 1.0
        } else {
            self.quadrature_phase
        };
        self.bit_size() * lag
    }

    pub fn is_ideal(&self) -> bool {
        self.noise_std == 0.0 && self.slip_std == 0.0 && self.slip_mean == 1.0
    }
}

fn check_std_dev(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::StdDev { name, value })
    }
}

// =========================================================================
// == Bit Pair ==
// =========================================================================

/// One sample of the two encoder channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BitPair {
    pub a: bool,
    pub b: bool,
}

impl BitPair {
    pub const fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    /// Position of this pair in the forward cycle `(0,0) → (0,1) → (1,1) → (1,0)`.
    pub fn gray_index(self) -> usize {
        match (self.a, self.b) {
            (false, false) => 0,
            (false, true) => 1,
            (true, true) => 2,
            (true, false) => 3,
        }
    }

    /// Quantizes a wheel angle into the channel levels of an ideal encoder.
    pub fn from_angle(angle: f64, config: &EncoderConfig) -> Self {
        let bit_size = config.bit_size();
        Self {
            a: channel_level(angle, bit_size),
            b: channel_level(angle - config.phase_offset(), bit_size),
        }
    }
}

impl From<(bool, bool)> for BitPair {
    fn from((a, b): (bool, bool)) -> Self {
        Self { a, b }
    }
}

impl From<BitPair> for (bool, bool) {
    fn from(bits: BitPair) -> Self {
        (bits.a, bits.b)
    }
}

fn channel_level(angle: f64, bit_size: f64) -> bool {
    ((angle / bit_size).floor() as i64).rem_euclid(2) == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quadrature::{decode, Direction};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rejects_invalid_parameters() {
        assert_eq!(EncoderConfig::new(0), Err(ConfigError::Resolution(0)));
        let config = EncoderConfig::new(16).unwrap();
        assert!(matches!(
            config.with_noise(-0.1),
            Err(ConfigError::StdDev { name: "noise_std", .. })
        ));
        assert_eq!(config.with_slip(0.0, 0.1), Err(ConfigError::SlipMean(0.0)));
        assert_eq!(config.with_phase(1.0), Err(ConfigError::QuadraturePhase(1.0)));
        assert_eq!(config.with_phase(2.0), Err(ConfigError::QuadraturePhase(2.0)));
        assert!(config.with_phase(1.25).is_ok());
    }

    #[test]
    fn test_bit_and_transition_angles() {
        let config = EncoderConfig::new(4).unwrap();
        assert_abs_diff_eq!(config.bit_size(), TAU / 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(config.transition_angle(), TAU / 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(config.phase_offset(), 1.5 * TAU / 4.0, epsilon = 1e-12);
        assert!(config.is_ideal());
    }

    #[test]
    fn test_increasing_angle_walks_forward_gray_cycle() {
        let config = EncoderConfig::new(2).unwrap();
        let quarter = config.bit_size() / 2.0;
        // Sample in the middle of each Gray state.
        let expected = [(false, false), (false, true), (true, true), (true, false)];
        for cycle in 0..3 {
            for (i, pair) in expected.iter().enumerate() {
                let angle = (cycle * 4 + i) as f64 * quarter + quarter / 2.0;
                assert_eq!(BitPair::from_angle(angle, &config), BitPair::from(*pair));
            }
        }
    }

    #[test]
    fn test_every_accepted_phase_walks_forward() {
        for phase in [0.5, 0.25, 1.25, 1.5, 1.75] {
            let config = EncoderConfig::new(2).unwrap().with_phase(phase).unwrap();
            let bit_size = config.bit_size();
            let increment = bit_size / 200.0;

            let mut angle = bit_size * 0.001;
            let mut previous = BitPair::from_angle(angle, &config);
            let mut changes = 0;
            while angle < 3.0 * bit_size {
                angle += increment;
                let current = BitPair::from_angle(angle, &config);
                if current != previous {
                    assert_eq!(
                        decode(previous, current),
                        Direction::Forward,
                        "phase {phase} at angle {angle}"
                    );
                    changes += 1;
                }
                previous = current;
            }
            // Two transitions per bit period.
            assert_eq!(changes, 6, "phase {phase}");
        }
    }

    #[test]
    fn test_negative_angles_continue_the_cycle() {
        let config = EncoderConfig::new(2).unwrap();
        let quarter = config.bit_size() / 2.0;
        // Just below zero sits the last state of the previous cycle.
        assert_eq!(
            BitPair::from_angle(-quarter / 2.0, &config),
            BitPair::new(true, false)
        );
        assert_eq!(
            BitPair::from_angle(-1.5 * quarter, &config),
            BitPair::new(true, true)
        );
    }

    #[test]
    fn test_gray_index_round_trip() {
        let states = [
            BitPair::new(false, false),
            BitPair::new(false, true),
            BitPair::new(true, true),
            BitPair::new(true, false),
        ];
        for (i, state) in states.iter().enumerate() {
            assert_eq!(state.gray_index(), i);
        }
    }
}
