//! Chungus Numbers - a drag-and-drop multiplication quiz
//!
//! Core modules:
//! - `sim`: Deterministic game engine (problem generation, round state machine, timers)
//! - `tuning`: Data-driven game balance and timings
//! - `highscores`: Session leaderboard
//! - `web`: wasm-bindgen facade for a browser view (wasm32 only)

pub mod highscores;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::HighScores;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Virtual clock step used by the headless driver (ms)
    pub const SIM_STEP_MS: u64 = 50;

    /// Correct answers needed to clear a level
    pub const QUESTIONS_PER_ROUND: u32 = 5;
    /// Mistakes tolerated per round; the last one makes Chungus sick
    pub const MAX_MISTAKES: u32 = 3;
    /// Points per correct answer, multiplied by the level
    pub const POINTS_PER_LEVEL: u64 = 100;

    /// Candidate answers shown per problem (one correct)
    pub const OPTION_COUNT: usize = 4;
    /// Smallest distractor spread around the product
    pub const MIN_DEVIATION: i64 = 5;
    /// Distractor spread as a percentage of the product
    pub const DEVIATION_PERCENT: i64 = 30;

    /// Pause after a correct answer before the next problem (ms)
    pub const NEXT_PROBLEM_DELAY_MS: u64 = 1500;
    /// Pause after the last correct answer before the next level intro (ms)
    pub const LEVEL_ADVANCE_DELAY_MS: u64 = 2000;
    /// How long the angry face lasts after a wrong answer (ms)
    pub const ANGER_DURATION_MS: u64 = 1000;

    /// Spacing between sickness phases (ms); phase N lands at N * interval
    pub const SICKNESS_PHASE_INTERVAL_MS: u64 = 500;
    /// Final sickness phase; reaching it starts the departure
    pub const SICKNESS_PHASES: u8 = 4;
    /// Departure tick period (ms)
    pub const DEPARTURE_TICK_MS: u64 = 100;
    /// Departure offset gained per tick
    pub const DEPARTURE_STEP: u32 = 20;
    /// Offset at which the character has left the screen
    pub const DEPARTURE_DISTANCE: u32 = 300;
    /// Delay between leaving the screen and game over (ms)
    pub const GAME_OVER_DELAY_MS: u64 = 500;
}
