//! Linear congruential generator driving dungeon layout.
//!
//! Layouts must be regenerable from a stored seed, so this stays a plain LCG
//! with fixed constants rather than a general-purpose RNG.

use crate::seed::generate_runtime_seed;

const MULTIPLIER: u64 = 1_103_515_245;
const INCREMENT: u64 = 12_345;
const STATE_MASK: u64 = 0x7FFF_FFFF;
const MODULUS: f64 = 2_147_483_648.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    /// Seeds below 2^31 are used as-is; higher bits are folded in so that
    /// every bit of a 64-bit seed influences the sequence.
    pub fn new(seed: u64) -> Self {
        Self { state: (seed ^ (seed >> 31) ^ (seed >> 62)) & STATE_MASK }
    }

    pub fn from_time() -> Self {
        Self::new(generate_runtime_seed())
    }

    /// Uniform float in `[0, 1)`.
    pub fn next(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT) & STATE_MASK;
        self.state as f64 / MODULUS
    }

    /// Uniform integer in `[min, max]`, both inclusive.
    pub fn next_int(&mut self, min: usize, max: usize) -> usize {
        debug_assert!(min <= max);
        let span = max - min;
        // Float rounding on very wide spans can land one past `max`.
        let offset = (self.next() * (span as f64 + 1.0)) as usize;
        min + offset.min(span)
    }
}
