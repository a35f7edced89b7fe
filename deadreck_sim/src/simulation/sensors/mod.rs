// deadreck_sim/src/simulation/sensors/mod.rs

pub mod encoder;
