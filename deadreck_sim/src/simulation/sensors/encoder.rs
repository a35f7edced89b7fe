// deadreck_sim/src/simulation/sensors/encoder.rs

use deadreck_core::models::encoder::{BitPair, EncoderConfig};
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};

use crate::error::SimError;

/// Samples the two channel levels for a wheel at `wheel_angle`, with Gaussian
/// angular noise added before the channels are computed.
///
/// With `noise_std == 0` this is exactly [`BitPair::from_angle`] and the RNG
/// is left untouched.
pub fn simulate_encoder<R: Rng + ?Sized>(
    wheel_angle: f64,
    config: &EncoderConfig,
    rng: &mut R,
) -> BitPair {
    let noise_std = config.noise_std();
    let measured = if noise_std > 0.0 {
        let z: f64 = StandardNormal.sample(rng);
        wheel_angle + z * noise_std
    } else {
        wheel_angle
    };
    BitPair::from_angle(measured, config)
}

/// An encoder with its slip distribution built once up front.
#[derive(Debug, Clone)]
pub struct EncoderSimulator {
    config: EncoderConfig,
    slip_dist: Normal<f64>,
}

impl EncoderSimulator {
    pub fn new(config: EncoderConfig) -> Result<Self, SimError> {
        let slip_dist = Normal::new(config.slip_mean(), config.slip_std())?;
        Ok(Self { config, slip_dist })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Scales a commanded wheel rotation by a random slip factor. The
    /// factor is drawn per wheel per tick.
    pub fn slip<R: Rng + ?Sized>(&self, delta: f64, rng: &mut R) -> f64 {
        if self.config.slip_std() > 0.0 {
            delta * self.slip_dist.sample(rng)
        } else {
            delta * self.config.slip_mean()
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, wheel_angle: f64, rng: &mut R) -> BitPair {
        simulate_encoder(wheel_angle, &self.config, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::PI;

    fn ideal(bits: u32) -> EncoderConfig {
        EncoderConfig::new(bits).unwrap()
    }

    #[test]
    fn test_noiseless_sample_matches_channel_formulas() {
        let config = ideal(2); // bit size π
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        // A = floor(θ/π) mod 2, B = floor((θ - 1.5π)/π) mod 2
        assert_eq!(simulate_encoder(0.1, &config, &mut rng), BitPair::new(false, false));
        assert_eq!(simulate_encoder(PI / 2.0 + 0.1, &config, &mut rng), BitPair::new(false, true));
        assert_eq!(simulate_encoder(PI + 0.1, &config, &mut rng), BitPair::new(true, true));
        assert_eq!(simulate_encoder(1.5 * PI + 0.1, &config, &mut rng), BitPair::new(true, false));
        // Negative angles wrap into the same cycle.
        assert_eq!(simulate_encoder(-0.1, &config, &mut rng), BitPair::new(true, false));
    }

    #[test]
    fn test_noise_is_deterministic_per_seed() {
        let config = ideal(64).with_noise(0.05).unwrap();
        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..200)
                .map(|i| simulate_encoder(f64::from(i) * 0.01, &config, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn test_noise_flips_bits_near_transitions() {
        // Sitting right on a channel A edge, noise must produce both levels.
        let config = ideal(2).with_noise(0.1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let samples: Vec<bool> = (0..100)
            .map(|_| simulate_encoder(PI, &config, &mut rng).a)
            .collect();
        assert!(samples.iter().any(|a| *a));
        assert!(samples.iter().any(|a| !*a));
    }

    #[test]
    fn test_ideal_slip_is_identity() {
        let sim = EncoderSimulator::new(ideal(64)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_abs_diff_eq!(sim.slip(0.25, &mut rng), 0.25);
    }

    #[test]
    fn test_slip_mean_scales_rotation() {
        let sim = EncoderSimulator::new(ideal(64).with_slip(0.9, 0.01).unwrap()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let n = 2000;
        let mean = (0..n).map(|_| sim.slip(1.0, &mut rng)).sum::<f64>() / f64::from(n);
        assert_abs_diff_eq!(mean, 0.9, epsilon = 0.005);
    }
}
