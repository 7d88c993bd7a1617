//! Operand ranges per level
//!
//! Ranges widen for the first four levels, then stay at [5, 15] forever.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::problem::Problem;

/// Inclusive operand range for a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyRange {
    pub min: u32,
    pub max: u32,
}

impl DifficultyRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Fixed lookup table; every level past 4 shares the master range
    pub fn for_level(level: u32) -> Self {
        match level {
            1 => Self::new(1, 5),
            2 => Self::new(2, 7),
            3 => Self::new(3, 9),
            4 => Self::new(4, 12),
            _ => Self::new(5, 15),
        }
    }

    #[inline]
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Number of distinct operand values
    #[inline]
    pub fn width(&self) -> u32 {
        self.max - self.min + 1
    }

    /// Number of distinct ordered (num1, num2) pairs
    pub fn pair_count(&self) -> usize {
        let w = self.width() as usize;
        w * w
    }

    /// Uniform draw of one operand
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.random_range(self.min..=self.max)
    }

    /// Every ordered pair in the range, row-major
    pub fn pairs(&self) -> impl Iterator<Item = Problem> + use<> {
        let (min, max) = (self.min, self.max);
        (min..=max).flat_map(move |a| (min..=max).map(move |b| Problem::new(a, b)))
    }
}

/// Blurb shown on the level intro screen
pub fn level_intro_message(level: u32) -> &'static str {
    match level {
        1 => "Let's start with easy numbers!",
        2 => "Getting a bit trickier!",
        3 => "Now for some bigger numbers!",
        4 => "Expert multiplication time!",
        _ => "Master level - Show your skills!",
    }
}
