//! Seeded randomness for combat rolls.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::seed::mix_seed_stream;

const COMBAT_STREAM: u64 = 0xC0;
const LOOT_STREAM: u64 = 0x100;

#[derive(Clone, Debug)]
pub struct CombatRng {
    rng: ChaCha8Rng,
}

impl CombatRng {
    pub fn new(seed: u64) -> Self {
        Self::on_stream(seed, COMBAT_STREAM)
    }

    /// Draws for post-victory loot. Separate from the combat stream, so rolling
    /// loot never shifts a replayed fight.
    pub fn loot(seed: u64) -> Self {
        Self::on_stream(seed, LOOT_STREAM)
    }

    fn on_stream(seed: u64, stream: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(mix_seed_stream(seed, stream)) }
    }

    /// Uniform float in `[0, 1)` built from the top 53 bits of a draw.
    pub fn next_f64(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 / (1_u64 << 53) as f64
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Uniform integer in `min..=max`; a reversed range yields `min`.
    pub fn between(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = u64::from(max - min) + 1;
        let offset = (self.next_f64() * span as f64) as u64;
        min + offset.min(span - 1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_are_reproducible_and_in_range() {
        let mut left = CombatRng::new(11);
        let mut right = CombatRng::new(11);
        for _ in 0..1_000 {
            let value = left.next_f64();
            assert_eq!(value.to_bits(), right.next_f64().to_bits());
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn certain_and_impossible_chances() {
        let mut rng = CombatRng::new(5);
        for _ in 0..100 {
            assert!(rng.chance(1.0));
            assert!(!rng.chance(0.0));
        }
    }

    #[test]
    fn between_covers_the_inclusive_range() {
        let mut rng = CombatRng::loot(3);
        let mut seen = [false; 6];
        for _ in 0..500 {
            let value = rng.between(5, 10);
            assert!((5..=10).contains(&value));
            seen[(value - 5) as usize] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
        assert_eq!(rng.between(4, 4), 4);
        assert_eq!(rng.between(9, 2), 9);
        assert!(rng.between(0, u32::MAX) <= u32::MAX);
    }

    #[test]
    fn loot_and_combat_streams_differ() {
        let mut combat = CombatRng::new(17);
        let mut loot = CombatRng::loot(17);
        let same = (0..8).filter(|_| combat.next_f64().to_bits() == loot.next_f64().to_bits()).count();
        assert!(same < 8);
    }
}
