// deadreck_sim/src/simulation/core/prng.rs

use rand::rngs::OsRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::SimError;

/// A newtype wrapper around `ChaCha8Rng`.
/// This is the central, deterministic pseudo-random number generator for the simulation.
#[derive(Debug, Clone)]
pub struct SimulationRng(pub ChaCha8Rng);

impl SimulationRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Seeds from `seed` when given, otherwise from the operating system.
    pub fn from_seed_option(seed: Option<u64>) -> Result<Self, SimError> {
        match seed {
            Some(seed) => Ok(Self::seeded(seed)),
            None => Ok(Self(ChaCha8Rng::from_rng(OsRng)?)),
        }
    }
}
