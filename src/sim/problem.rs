//! Problem generation
//!
//! A problem is an ordered operand pair drawn from the level's range, shown
//! with four shuffled candidate answers: the product and three distractors
//! scattered around it.

use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyRange;
use crate::consts::{DEVIATION_PERCENT, MIN_DEVIATION, OPTION_COUNT};

/// Rejection draws before falling back to enumerating the unused pairs
const MAX_REJECTION_DRAWS: usize = 64;

/// A multiplication problem. Order matters: 2×3 and 3×2 are different keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Problem {
    pub num1: u32,
    pub num2: u32,
}

impl Problem {
    pub const fn new(num1: u32, num2: u32) -> Self {
        Self { num1, num2 }
    }

    #[inline]
    pub fn answer(&self) -> u32 {
        self.num1 * self.num2
    }

    #[inline]
    pub fn is_correct(&self, value: u32) -> bool {
        value == self.answer()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.num1, self.num2)
    }
}

/// The four candidate answers, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet([u32; OPTION_COUNT]);

impl OptionSet {
    pub fn values(&self) -> &[u32] {
        &self.0
    }

    pub fn contains(&self, value: u32) -> bool {
        self.0.contains(&value)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

/// Problems already asked during the current level attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedProblemSet {
    keys: BTreeSet<Problem>,
}

impl UsedProblemSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, problem: &Problem) -> bool {
        self.keys.contains(problem)
    }

    /// Returns false if the key was already present
    pub fn insert(&mut self, problem: Problem) -> bool {
        self.keys.insert(problem)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// True once every ordered pair of `range` could have been used
    pub fn is_exhausted(&self, range: &DifficultyRange) -> bool {
        self.keys.len() >= range.pair_count()
    }
}

/// Output of a single generation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratedProblem {
    pub problem: Problem,
    pub options: OptionSet,
}

/// Generate the next problem for `level`, recording it in `used`
pub fn generate_problem<R: Rng + ?Sized>(
    level: u32,
    used: &mut UsedProblemSet,
    rng: &mut R,
) -> GeneratedProblem {
    let range = DifficultyRange::for_level(level);
    let problem = draw_unused(&range, used, rng);
    used.insert(problem);

    GeneratedProblem {
        problem,
        options: build_options(problem.answer(), rng),
    }
}

/// Uniform draw over the pairs not yet in `used`, or any pair once exhausted
fn draw_unused<R: Rng + ?Sized>(
    range: &DifficultyRange,
    used: &UsedProblemSet,
    rng: &mut R,
) -> Problem {
    if used.is_exhausted(range) {
        log::warn!(
            "All {} problems in {}..={} used, allowing a repeat",
            range.pair_count(),
            range.min,
            range.max
        );
        return Problem::new(range.sample(rng), range.sample(rng));
    }

    for _ in 0..MAX_REJECTION_DRAWS {
        let candidate = Problem::new(range.sample(rng), range.sample(rng));
        if !used.contains(&candidate) {
            return candidate;
        }
    }

    // Nearly full: pick directly among what is left
    let remaining: Vec<Problem> = range.pairs().filter(|p| !used.contains(p)).collect();
    match remaining.choose(rng) {
        Some(&problem) => problem,
        None => Problem::new(range.sample(rng), range.sample(rng)),
    }
}

/// Spread of the distractor window around `correct`
pub fn distractor_deviation(correct: u32) -> i64 {
    (correct as i64 * DEVIATION_PERCENT / 100).max(MIN_DEVIATION)
}

/// Three distinct positive distractors plus `correct`, shuffled
pub fn build_options<R: Rng + ?Sized>(correct: u32, rng: &mut R) -> OptionSet {
    let deviation = distractor_deviation(correct);
    let mut values = [correct; OPTION_COUNT];
    let mut found = 0;

    while found < OPTION_COUNT - 1 {
        let wrong = correct as i64 + rng.random_range(-deviation..deviation);
        if wrong <= 0 || wrong == correct as i64 {
            continue;
        }
        let wrong = wrong as u32;
        if values[..found].contains(&wrong) {
            continue;
        }
        values[found] = wrong;
        found += 1;
    }

    values.shuffle(rng);
    OptionSet(values)
}
