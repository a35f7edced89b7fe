// deadreck_core/src/models/mod.rs

//! Sensor-side models: encoder quantization, quadrature decoding and the
//! per-wheel state that ties them together.

pub mod encoder;
pub mod quadrature;
pub mod wheel;
