// deadreck_sim/src/simulation/core/mod.rs

pub mod prng;
