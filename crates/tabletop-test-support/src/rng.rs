//! Scripted dice for tests.

use tabletop_core::rng::DeterministicRng;

/// Always rolls the lowest face.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// Replays a fixed list of rolls, in order.
///
/// Each value is clamped into the requested range, so a script of `[25]`
/// against a d20 yields 20.
#[derive(Debug)]
pub struct SequenceRng {
    rolls: Vec<u32>,
    next: usize,
}

impl SequenceRng {
    /// Scripts the given rolls.
    #[must_use]
    pub fn new(rolls: Vec<u32>) -> Self {
        Self { rolls, next: 0 }
    }

    /// How many scripted rolls have been consumed.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.next
    }
}

impl DeterministicRng for SequenceRng {
    /// # Panics
    ///
    /// Panics once the script is exhausted, so a test that rolls more dice
    /// than it scripted fails loudly.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let Some(&roll) = self.rolls.get(self.next) else {
            panic!("SequenceRng exhausted after {} rolls", self.rolls.len());
        };
        self.next += 1;
        roll.clamp(min, max.max(min))
    }
}
