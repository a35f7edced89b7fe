// deadreck_core/src/models/quadrature.rs

//! Direction recovery from consecutive quadrature samples.
//!
//! The decoder only ever looks at one wheel. Combining wheels into motion is
//! the job of the odometry integrator.

use crate::models::encoder::BitPair;

/// What a single sampling interval tells us about one wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Moved one Gray state along the forward cycle.
    Forward,
    /// Moved one Gray state against the forward cycle.
    Backward,
    /// Same state as the previous sample.
    #[default]
    None,
    /// Jumped two states: the direction cannot be recovered.
    Uncertain,
}

impl Direction {
    /// Signed step count contributed to odometry. Uncertain readings count as
    /// no motion.
    pub fn steps(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
            Direction::None | Direction::Uncertain => 0,
        }
    }

    pub fn is_fault(self) -> bool {
        self == Direction::Uncertain
    }

    pub fn is_motion(self) -> bool {
        matches!(self, Direction::Forward | Direction::Backward)
    }
}

// =========================================================================
// == Transition Table ==
// =========================================================================

/// Neighbours of one Gray state.
#[derive(Debug, Clone, Copy)]
struct Adjacency {
    forward: BitPair,
    backward: BitPair,
}

const S00: BitPair = BitPair::new(false, false);
const S01: BitPair = BitPair::new(false, true);
const S11: BitPair = BitPair::new(true, true);
const S10: BitPair = BitPair::new(true, false);

/// Indexed by `BitPair::gray_index`. Any observed change that is not listed
/// here is a skipped state.
const TRANSITIONS: [Adjacency; 4] = [
    Adjacency { forward: S01, backward: S10 }, // (0,0)
    Adjacency { forward: S11, backward: S00 }, // (0,1)
    Adjacency { forward: S10, backward: S01 }, // (1,1)
    Adjacency { forward: S00, backward: S11 }, // (1,0)
];

/// Classifies the change between two consecutive samples of one wheel.
pub fn decode(prev: BitPair, curr: BitPair) -> Direction {
    if prev == curr {
        return Direction::None;
    }
    let adjacency = &TRANSITIONS[prev.gray_index()];
    if curr == adjacency.forward {
        Direction::Forward
    } else if curr == adjacency.backward {
        Direction::Backward
    } else {
        Direction::Uncertain
    }
}

// =========================================================================
// == Stateful Decoder ==
// =========================================================================

/// Per-wheel decoder state carried from one tick to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureDecoder {
    previous: BitPair,
    last_direction: Direction,
    /// Time of the most recent bit-pair change.
    last_change_at: Option<f64>,
    /// Time at which the decoded direction last flipped sign.
    last_reversal_at: Option<f64>,
    /// Sign of the last confident step, used to detect reversals.
    heading_sign: i8,
    transitions: u64,
    faults: u64,
}

impl QuadratureDecoder {
    pub fn new(initial: BitPair) -> Self {
        Self {
            previous: initial,
            last_direction: Direction::None,
            last_change_at: None,
            last_reversal_at: None,
            heading_sign: 0,
            transitions: 0,
            faults: 0,
        }
    }

    /// Feeds one sample taken at `timestamp` and returns the decoded direction.
    pub fn update(&mut self, bits: BitPair, timestamp: f64) -> Direction {
        let direction = decode(self.previous, bits);

        if bits != self.previous {
            self.last_change_at = Some(timestamp);
            self.transitions += 1;
        }
        if direction.is_fault() {
            self.faults += 1;
        }
        if direction.is_motion() {
            let sign = direction.steps();
            if self.heading_sign != 0 && sign != self.heading_sign {
                self.last_reversal_at = Some(timestamp);
            }
            self.heading_sign = sign;
        }

        self.previous = bits;
        self.last_direction = direction;
        direction
    }

    pub fn bits(&self) -> BitPair {
        self.previous
    }

    pub fn last_direction(&self) -> Direction {
        self.last_direction
    }

    pub fn last_change_at(&self) -> Option<f64> {
        self.last_change_at
    }

    pub fn last_reversal_at(&self) -> Option<f64> {
        self.last_reversal_at
    }

    /// Number of samples whose bit-pair differed from the previous one.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Number of `Uncertain` readings so far.
    pub fn faults(&self) -> u64 {
        self.faults
    }
}
