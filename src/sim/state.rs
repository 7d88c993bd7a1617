//! Game state and the read-only view handed to the renderer
//!
//! `GameState` is only ever mutated by `Game` transitions. Renderers get a
//! `&GameState` or a [`ViewModel`] snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::difficulty::{DifficultyRange, level_intro_message};
use super::problem::{OptionSet, Problem, UsedProblemSet};
use super::scheduler::TimerId;
use crate::consts::SICKNESS_PHASES;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Level title card, waiting for Start
    LevelIntro,
    /// A problem is on screen and answers are accepted
    Playing,
    /// Correct answer given, next problem pending
    Answered,
    /// Last question of the round answered, level intro pending
    RoundComplete,
    /// Third mistake landed; the sickness sequence is running
    Sick,
    /// Run ended
    GameOver,
}

/// Why an answer was not evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    LevelIntro,
    AwaitingNextProblem,
    RoundComplete,
    Sick,
    GameOver,
}

/// Feedback line under the character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Feedback {
    #[default]
    None,
    Correct,
    Wrong,
    LevelComplete { level: u32 },
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::None => Ok(()),
            Feedback::Correct => f.write_str("Yum yum! Correct!"),
            Feedback::Wrong => f.write_str("GRRR! WRONG ANSWER!"),
            Feedback::LevelComplete { level } => write!(f, "Level {} Complete!", level),
        }
    }
}

/// Complete engine state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// 1-based level
    pub level: u32,
    pub score: u64,
    /// Correct answers so far this round
    pub questions_in_round: u32,
    /// Mistakes so far this round
    pub wrong_answers_in_round: u32,
    /// Active problem (None before the first level starts)
    pub problem: Option<Problem>,
    pub options: Option<OptionSet>,
    pub used_problems: UsedProblemSet,
    pub feedback: Feedback,
    pub last_answer_correct: Option<bool>,
    /// Angry face after a wrong answer
    pub angry: bool,
    /// Mouth opens while an answer is being dragged
    pub mouth_open: bool,
    /// 0 until sick, then 1..=4
    pub sickness_phase: u8,
    /// Exit animation displacement
    pub departure_offset: u32,
    /// Bumped on reset and level start; older timers are stale
    pub epoch: u64,
    /// Repeating departure tick, while it runs
    pub departure_timer: Option<TimerId>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Canonical initial state
    pub fn new() -> Self {
        Self {
            phase: GamePhase::LevelIntro,
            level: 1,
            score: 0,
            questions_in_round: 0,
            wrong_answers_in_round: 0,
            problem: None,
            options: None,
            used_problems: UsedProblemSet::new(),
            feedback: Feedback::None,
            last_answer_correct: None,
            angry: false,
            mouth_open: false,
            sickness_phase: 0,
            departure_offset: 0,
            epoch: 0,
            departure_timer: None,
        }
    }

    #[inline]
    pub fn showing_level_intro(&self) -> bool {
        self.phase == GamePhase::LevelIntro
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Sickness only ends in game over, so the flag stays up until reset
    #[inline]
    pub fn is_sick(&self) -> bool {
        matches!(self.phase, GamePhase::Sick | GamePhase::GameOver)
    }

    pub fn lives(&self, max_mistakes: u32) -> u32 {
        max_mistakes.saturating_sub(self.wrong_answers_in_round)
    }

    pub fn range(&self) -> DifficultyRange {
        DifficultyRange::for_level(self.level)
    }

    /// None when answers are accepted
    pub fn ignore_reason(&self) -> Option<IgnoreReason> {
        match self.phase {
            GamePhase::Playing => None,
            GamePhase::LevelIntro => Some(IgnoreReason::LevelIntro),
            GamePhase::Answered => Some(IgnoreReason::AwaitingNextProblem),
            GamePhase::RoundComplete => Some(IgnoreReason::RoundComplete),
            GamePhase::Sick => Some(IgnoreReason::Sick),
            GamePhase::GameOver => Some(IgnoreReason::GameOver),
        }
    }

    /// Build the renderer snapshot
    pub fn view(&self, tuning: &Tuning) -> ViewModel {
        let range = self.range();
        ViewModel {
            phase: self.phase,
            level: self.level,
            score: self.score,
            questions_in_round: self.questions_in_round,
            questions_per_round: tuning.questions_per_round,
            lives: self.lives(tuning.max_mistakes),
            problem: self.problem,
            options: self.options.map(|o| o.values().to_vec()).unwrap_or_default(),
            feedback: self.feedback.to_string(),
            last_answer_correct: self.last_answer_correct,
            range_min: range.min,
            range_max: range.max,
            intro_message: level_intro_message(self.level),
            showing_level_intro: self.showing_level_intro(),
            game_over: self.is_game_over(),
            interactive: self.ignore_reason().is_none(),
            sick: self.is_sick(),
            sickness_phase: self.sickness_phase,
            angry: self.angry,
            mouth_open: self.mouth_open,
            door_visible: self.sickness_phase >= SICKNESS_PHASES,
            departure_offset: self.departure_offset,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub phase: GamePhase,
    pub level: u32,
    pub score: u64,
    pub questions_in_round: u32,
    pub questions_per_round: u32,
    pub lives: u32,
    pub problem: Option<Problem>,
    pub options: Vec<u32>,
    pub feedback: String,
    pub last_answer_correct: Option<bool>,
    pub range_min: u32,
    pub range_max: u32,
    pub intro_message: &'static str,
    pub showing_level_intro: bool,
    pub game_over: bool,
    /// Drop target enabled
    pub interactive: bool,
    pub sick: bool,
    pub sickness_phase: u8,
    pub angry: bool,
    pub mouth_open: bool,
    pub door_visible: bool,
    pub departure_offset: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_view() {
        let view = GameState::new().view(&Tuning::default());
        assert_eq!(view.level, 1);
        assert_eq!(view.score, 0);
        assert_eq!(view.lives, 3);
        assert!(view.showing_level_intro);
        assert!(!view.game_over);
        assert!(!view.interactive);
        assert!(view.options.is_empty());
        assert_eq!(view.feedback, "");
        assert_eq!((view.range_min, view.range_max), (1, 5));
    }

    #[test]
    fn test_feedback_text() {
        assert_eq!(Feedback::Correct.to_string(), "Yum yum! Correct!");
        assert_eq!(Feedback::Wrong.to_string(), "GRRR! WRONG ANSWER!");
        assert_eq!(Feedback::LevelComplete { level: 3 }.to_string(), "Level 3 Complete!");
    }

    #[test]
    fn test_ignore_reason_only_clear_while_playing() {
        let mut state = GameState::new();
        assert_eq!(state.ignore_reason(), Some(IgnoreReason::LevelIntro));
        state.phase = GamePhase::Playing;
        assert_eq!(state.ignore_reason(), None);
        state.phase = GamePhase::Sick;
        assert_eq!(state.ignore_reason(), Some(IgnoreReason::Sick));
        assert!(state.is_sick());
    }

    #[test]
    fn test_lives_never_underflow() {
        let mut state = GameState::new();
        state.wrong_answers_in_round = 5;
        assert_eq!(state.lives(3), 0);
    }
}
