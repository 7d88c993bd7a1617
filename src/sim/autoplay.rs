//! Idle/demo player
//!
//! Drives a [`Game`] the way a player would: presses Start on every intro and
//! drops an answer whenever the character accepts one. Accuracy controls how
//! often the correct option is picked.

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::scheduler::Scheduler;
use super::state::ViewModel;
use super::tick::{AnswerOutcome, Game};

/// Pick an option from the view: the product with probability `accuracy`,
/// otherwise one of the distractors
pub fn choose_answer<R: Rng + ?Sized>(view: &ViewModel, accuracy: f64, rng: &mut R) -> Option<u32> {
    let answer = view.problem?.answer();
    if rng.random_bool(accuracy.clamp(0.0, 1.0)) {
        return Some(answer);
    }
    let wrong: Vec<u32> = view.options.iter().copied().filter(|&v| v != answer).collect();
    wrong.choose(rng).copied()
}

/// What the autoplayer did on a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoAction {
    StartedLevel(u32),
    Answered(u32, AnswerOutcome),
    Waiting,
}

#[derive(Debug, Clone)]
pub struct AutoPlayer {
    accuracy: f64,
    rng: Pcg32,
}

impl AutoPlayer {
    pub fn new(accuracy: f64, seed: u64) -> Self {
        Self {
            accuracy: accuracy.clamp(0.0, 1.0),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Take at most one action on the game
    pub fn act<S: Scheduler>(&mut self, game: &mut Game<S>) -> AutoAction {
        let view = game.snapshot();
        if view.showing_level_intro {
            game.start_level();
            return AutoAction::StartedLevel(view.level);
        }
        if !view.interactive {
            return AutoAction::Waiting;
        }
        match choose_answer(&view, self.accuracy, &mut self.rng) {
            Some(value) => {
                game.begin_drag();
                AutoAction::Answered(value, game.submit_answer(value))
            }
            None => AutoAction::Waiting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_player_always_correct() {
        let mut game = Game::new(21);
        let mut player = AutoPlayer::new(1.0, 1);
        assert_eq!(player.act(&mut game), AutoAction::StartedLevel(1));
        match player.act(&mut game) {
            AutoAction::Answered(_, AnswerOutcome::Correct { points, .. }) => assert_eq!(points, 100),
            other => panic!("unexpected action {:?}", other),
        }
        assert_eq!(player.act(&mut game), AutoAction::Waiting);
    }

    #[test]
    fn test_hopeless_player_picks_a_distractor() {
        let mut game = Game::new(22);
        game.start_level();
        let view = game.snapshot();
        let mut rng = Pcg32::seed_from_u64(2);
        let pick = choose_answer(&view, 0.0, &mut rng);
        let answer = view.problem.map(|p| p.answer());
        assert!(pick.is_some());
        assert_ne!(pick, answer);
        assert!(view.options.contains(&pick.unwrap_or_default()));
    }

    #[test]
    fn test_no_problem_no_answer() {
        let view = Game::new(23).snapshot();
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(choose_answer(&view, 1.0, &mut rng), None);
    }
}
