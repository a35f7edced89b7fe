// deadreck_sim/src/simulation/mod.rs

pub mod config;
pub mod core;
pub mod robot;
pub mod scenario;
pub mod sensors;
pub mod vehicles;
