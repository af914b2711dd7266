//! Dice.
//!
//! Initiative rolls go through `DeterministicRng` so tests can script them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of dice rolls.
pub trait DeterministicRng: Send + Sync {
    /// A uniform value in `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Rolls one die with `sides` faces: a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.next_u32_range(1, sides.max(1))
    }
}

/// Production RNG backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct StdRngSource(StdRng);

impl StdRngSource {
    /// Seeds from the operating system.
    #[must_use]
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Seeds from a fixed value, for reproducible sequences.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DeterministicRng for StdRngSource {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.0.random_range(min..=max)
    }
}
