//! Deterministic game engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time only through the `Scheduler` virtual clock
//! - No rendering or platform dependencies

pub mod autoplay;
pub mod difficulty;
pub mod problem;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use autoplay::{AutoAction, AutoPlayer, choose_answer};
pub use difficulty::{DifficultyRange, level_intro_message};
pub use problem::{
    GeneratedProblem, OptionSet, Problem, UsedProblemSet, build_options, distractor_deviation,
    generate_problem,
};
pub use scheduler::{Scheduler, Timer, TimerEvent, TimerId, TimerQueue};
pub use state::{Feedback, GamePhase, GameState, IgnoreReason, ViewModel};
pub use tick::{AnswerOutcome, Game};
