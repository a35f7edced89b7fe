// deadreck_core/src/models/wheel.rs

use tracing::warn;

use crate::geometry::WheelPosition;
use crate::models::encoder::{BitPair, EncoderConfig};
use crate::models::quadrature::{Direction, QuadratureDecoder};

/// Everything one wheel carries across ticks: the continuous rotation the
/// encoder is sampling, and the decoder that interprets its samples.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelState {
    position: WheelPosition,
    /// Accumulated rotation in radians. Unbounded.
    angle: f64,
    decoder: QuadratureDecoder,
}

impl WheelState {
    /// Creates a wheel at `initial_angle`, with the decoder primed on the ideal
    /// reading of that angle.
    pub fn new(position: WheelPosition, initial_angle: f64, encoder: &EncoderConfig) -> Self {
        Self {
            position,
            angle: initial_angle,
            decoder: QuadratureDecoder::new(BitPair::from_angle(initial_angle, encoder)),
        }
    }

    /// Adds a rotation increment (already including any slip).
    pub fn rotate(&mut self, delta: f64) {
        self.angle += delta;
    }

    /// Decodes a new encoder sample for this wheel.
    pub fn observe(&mut self, bits: BitPair, timestamp: f64) -> Direction {
        let previous = self.decoder.bits();
        let direction = self.decoder.update(bits, timestamp);
        if direction.is_fault() {
            warn!(
                wheel = ?self.position,
                timestamp,
                from = ?previous,
                to = ?bits,
                "Quadrature state skipped; treating tick as no motion"
            );
        }
        direction
    }

    pub fn position(&self) -> WheelPosition {
        self.position
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn bits(&self) -> BitPair {
        self.decoder.bits()
    }

    pub fn last_direction(&self) -> Direction {
        self.decoder.last_direction()
    }

    pub fn last_change_at(&self) -> Option<f64> {
        self.decoder.last_change_at()
    }

    pub fn decoder(&self) -> &QuadratureDecoder {
        &self.decoder
    }
}
