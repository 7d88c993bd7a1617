//! Round state machine
//!
//! Player intents (`start_level`, `submit_answer`, drag start/end) apply
//! immediately. Everything time-based goes through the [`Scheduler`] and is
//! applied when the host calls [`Game::advance`]. Each callback runs to
//! completion before the next one fires.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::problem::generate_problem;
use super::scheduler::{Scheduler, Timer, TimerEvent, TimerQueue};
use super::state::{Feedback, GamePhase, GameState, IgnoreReason, ViewModel};
use crate::consts::SICKNESS_PHASES;
use crate::tuning::Tuning;

/// Upper bound on timers fired by [`Game::settle`]
const MAX_SETTLE_STEPS: usize = 10_000;

/// Result of a submitted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Answer arrived while the game was not accepting input
    Ignored(IgnoreReason),
    Correct { points: u64, round_complete: bool },
    Wrong { lives_left: u32 },
    /// Last life lost; the sickness sequence has started
    Sick,
}

/// The engine: state, entropy, timing and balance
#[derive(Debug, Clone)]
pub struct Game<S: Scheduler = TimerQueue> {
    state: GameState,
    rng: Pcg32,
    seed: u64,
    scheduler: S,
    tuning: Tuning,
}

impl Game<TimerQueue> {
    /// New run with default balance on a virtual clock
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default(), TimerQueue::new())
    }
}

impl<S: Scheduler> Game<S> {
    pub fn with_tuning(seed: u64, tuning: Tuning, scheduler: S) -> Self {
        Self {
            state: GameState::new(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            scheduler,
            tuning,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn snapshot(&self) -> ViewModel {
        self.state.view(&self.tuning)
    }

    /// Back to level 1 from anywhere. Pending timers become stale.
    pub fn reset(&mut self) {
        if let Some(id) = self.state.departure_timer.take() {
            self.scheduler.cancel(id);
        }
        let epoch = self.state.epoch + 1;
        self.state = GameState::new();
        self.state.epoch = epoch;
        log::info!("Game reset (epoch {})", epoch);
    }

    /// Leave the level intro and show the first problem
    pub fn start_level(&mut self) -> bool {
        if !self.state.showing_level_intro() {
            log::debug!("start_level ignored in {:?}", self.state.phase);
            return false;
        }

        self.state.epoch += 1;
        self.state.used_problems.clear();
        self.state.phase = GamePhase::Playing;
        self.next_problem();

        let range = self.state.range();
        log::info!(
            "Level {} started (operands {}..={})",
            self.state.level,
            range.min,
            range.max
        );
        true
    }

    /// Player picked up an option; the mouth opens if answers are accepted
    pub fn begin_drag(&mut self) -> bool {
        if self.state.ignore_reason().is_some() {
            return false;
        }
        self.state.mouth_open = true;
        true
    }

    pub fn end_drag(&mut self) {
        self.state.mouth_open = false;
    }

    /// Player dropped `value` on the character
    pub fn submit_answer(&mut self, value: u32) -> AnswerOutcome {
        self.state.mouth_open = false;

        if let Some(reason) = self.state.ignore_reason() {
            log::debug!("Answer {} ignored: {:?}", value, reason);
            return AnswerOutcome::Ignored(reason);
        }

        let correct = self.state.problem.is_some_and(|p| p.is_correct(value));
        if correct {
            self.answer_correct()
        } else {
            self.answer_wrong()
        }
    }

    fn answer_correct(&mut self) -> AnswerOutcome {
        let points = self.state.level as u64 * self.tuning.points_per_level;
        self.state.score += points;
        self.state.feedback = Feedback::Correct;
        self.state.last_answer_correct = Some(true);
        self.state.angry = false;
        self.state.questions_in_round += 1;

        let round_complete = self.state.questions_in_round >= self.tuning.questions_per_round;
        if round_complete {
            self.state.feedback = Feedback::LevelComplete {
                level: self.state.level,
            };
            self.state.phase = GamePhase::RoundComplete;
            self.schedule(self.tuning.level_advance_delay_ms, TimerEvent::AdvanceLevel);
            log::info!(
                "Level {} complete, score {}",
                self.state.level,
                self.state.score
            );
        } else {
            self.state.phase = GamePhase::Answered;
            self.schedule(self.tuning.next_problem_delay_ms, TimerEvent::NextProblem);
        }

        AnswerOutcome::Correct {
            points,
            round_complete,
        }
    }

    fn answer_wrong(&mut self) -> AnswerOutcome {
        self.state.wrong_answers_in_round += 1;

        if self.state.wrong_answers_in_round >= self.tuning.max_mistakes {
            self.trigger_sickness();
            return AnswerOutcome::Sick;
        }

        self.state.feedback = Feedback::Wrong;
        self.state.last_answer_correct = Some(false);
        self.state.angry = true;
        self.schedule(self.tuning.anger_duration_ms, TimerEvent::ClearAnger);

        AnswerOutcome::Wrong {
            lives_left: self.state.lives(self.tuning.max_mistakes),
        }
    }

    fn trigger_sickness(&mut self) {
        self.state.phase = GamePhase::Sick;
        for phase in 1..=SICKNESS_PHASES {
            self.schedule(
                self.tuning.sickness_phase_delay_ms(phase),
                TimerEvent::SicknessPhase(phase),
            );
        }
        log::info!(
            "Too many wrong answers on level {}, Chungus is sick",
            self.state.level
        );
    }

    fn next_problem(&mut self) {
        let generated = generate_problem(
            self.state.level,
            &mut self.state.used_problems,
            &mut self.rng,
        );
        log::debug!(
            "Problem {} with options {:?}",
            generated.problem,
            generated.options.values()
        );
        self.state.problem = Some(generated.problem);
        self.state.options = Some(generated.options);
        self.state.feedback = Feedback::None;
        self.state.last_answer_correct = None;
        self.state.angry = false;
    }

    fn schedule(&mut self, delay_ms: u64, event: TimerEvent) {
        self.scheduler.schedule(delay_ms, self.state.epoch, event);
    }

    /// Advance the clock by `elapsed_ms`, firing every timer that comes due
    pub fn advance(&mut self, elapsed_ms: u64) {
        let until = self.scheduler.now_ms().saturating_add(elapsed_ms);
        while let Some(timer) = self.scheduler.pop_due(until) {
            self.fire(timer);
        }
        self.scheduler.advance_to(until);
    }

    /// Fire pending timers until none remain. Returns the time spent.
    pub fn settle(&mut self) -> u64 {
        let start = self.scheduler.now_ms();
        for _ in 0..MAX_SETTLE_STEPS {
            let Some(due) = self.scheduler.next_due_ms() else {
                break;
            };
            let now = self.scheduler.now_ms();
            self.advance(due.saturating_sub(now));
        }
        self.scheduler.now_ms() - start
    }

    fn fire(&mut self, timer: Timer) {
        if timer.epoch != self.state.epoch {
            log::debug!(
                "Discarding stale {:?} (epoch {}, now {})",
                timer.event,
                timer.epoch,
                self.state.epoch
            );
            if timer.period_ms.is_some() {
                self.scheduler.cancel(timer.id);
            }
            return;
        }

        match timer.event {
            TimerEvent::ClearAnger => self.state.angry = false,
            TimerEvent::NextProblem => {
                if self.state.phase == GamePhase::Answered {
                    self.state.phase = GamePhase::Playing;
                    self.next_problem();
                }
            }
            TimerEvent::AdvanceLevel => {
                if self.state.phase == GamePhase::RoundComplete {
                    self.state.level += 1;
                    self.state.questions_in_round = 0;
                    self.state.wrong_answers_in_round = 0;
                    self.state.phase = GamePhase::LevelIntro;
                    log::info!("Advancing to level {}", self.state.level);
                }
            }
            TimerEvent::SicknessPhase(phase) => self.enter_sickness_phase(phase),
            TimerEvent::DepartureTick => self.departure_tick(),
            TimerEvent::GameOver => {
                if self.state.phase == GamePhase::Sick {
                    self.state.phase = GamePhase::GameOver;
                    log::info!(
                        "Game over: score {} on level {}",
                        self.state.score,
                        self.state.level
                    );
                }
            }
        }
    }

    fn enter_sickness_phase(&mut self, phase: u8) {
        if self.state.phase != GamePhase::Sick || phase != self.state.sickness_phase + 1 {
            log::debug!(
                "Skipping sickness phase {} (at {}, {:?})",
                phase,
                self.state.sickness_phase,
                self.state.phase
            );
            return;
        }

        self.state.sickness_phase = phase;
        log::debug!("Sickness phase {}", phase);

        if phase == SICKNESS_PHASES {
            let id = self.scheduler.schedule_repeating(
                self.tuning.departure_tick_ms,
                self.state.epoch,
                TimerEvent::DepartureTick,
            );
            self.state.departure_timer = Some(id);
        }
    }

    fn departure_tick(&mut self) {
        if self.state.phase != GamePhase::Sick {
            return;
        }

        self.state.departure_offset += self.tuning.departure_step;
        if self.state.departure_offset >= self.tuning.departure_distance {
            if let Some(id) = self.state.departure_timer.take() {
                self.scheduler.cancel(id);
            }
            self.schedule(self.tuning.game_over_delay_ms, TimerEvent::GameOver);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fresh game already past the level 1 intro
    fn playing(seed: u64) -> Game {
        let mut game = Game::new(seed);
        assert!(game.start_level());
        game
    }

    fn answer(game: &Game) -> u32 {
        game.state().problem.map(|p| p.answer()).unwrap_or_default()
    }

    fn wrong(game: &Game) -> u32 {
        answer(game) + 1000
    }

    #[test]
    fn test_start_level_only_from_intro() {
        let mut game = Game::new(1);
        assert!(game.start_level());
        assert_eq!(game.state().phase, GamePhase::Playing);
        assert!(game.state().problem.is_some());
        assert_eq!(game.state().used_problems.len(), 1);
        assert!(!game.start_level());
    }

    #[test]
    fn test_answers_ignored_during_intro() {
        let mut game = Game::new(1);
        assert_eq!(
            game.submit_answer(4),
            AnswerOutcome::Ignored(IgnoreReason::LevelIntro)
        );
        assert_eq!(game.state().wrong_answers_in_round, 0);
    }

    #[test]
    fn test_correct_answer_scores_level_times_hundred() {
        let mut game = playing(2);
        let value = answer(&game);
        let outcome = game.submit_answer(value);
        assert_eq!(
            outcome,
            AnswerOutcome::Correct {
                points: 100,
                round_complete: false
            }
        );
        assert_eq!(game.state().score, 100);
        assert_eq!(game.state().questions_in_round, 1);
        assert_eq!(game.state().feedback, Feedback::Correct);
        assert_eq!(game.state().last_answer_correct, Some(true));
    }

    #[test]
    fn test_next_problem_after_delay() {
        let mut game = playing(3);
        let first = game.state().problem;
        let value = answer(&game);
        game.submit_answer(value);

        // Double drop during the pause is not scored twice
        assert_eq!(
            game.submit_answer(value),
            AnswerOutcome::Ignored(IgnoreReason::AwaitingNextProblem)
        );

        game.advance(1499);
        assert_eq!(game.state().phase, GamePhase::Answered);
        game.advance(1);
        assert_eq!(game.state().phase, GamePhase::Playing);
        assert_ne!(game.state().problem, first);
        assert_eq!(game.state().feedback, Feedback::None);
        assert_eq!(game.state().last_answer_correct, None);
        assert_eq!(game.state().used_problems.len(), 2);
    }

    #[test]
    fn test_wrong_answer_keeps_problem_and_calms_down() {
        let mut game = playing(4);
        let problem = game.state().problem;
        let value = wrong(&game);
        assert_eq!(game.submit_answer(value), AnswerOutcome::Wrong { lives_left: 2 });
        assert!(game.state().angry);
        assert_eq!(game.state().feedback, Feedback::Wrong);
        assert_eq!(game.state().problem, problem);

        game.advance(999);
        assert!(game.state().angry);
        game.advance(1);
        assert!(!game.state().angry);
        assert_eq!(game.state().phase, GamePhase::Playing);
    }

    #[test]
    fn test_round_complete_advances_level() {
        let mut game = playing(5);
        for i in 0..5 {
            let value = answer(&game);
            let outcome = game.submit_answer(value);
            assert_eq!(
                outcome,
                AnswerOutcome::Correct {
                    points: 100,
                    round_complete: i == 4
                }
            );
            game.advance(1500);
        }
        assert_eq!(game.state().phase, GamePhase::RoundComplete);
        assert_eq!(game.state().feedback, Feedback::LevelComplete { level: 1 });

        game.advance(500);
        assert_eq!(game.state().phase, GamePhase::LevelIntro);
        assert_eq!(game.state().level, 2);
        assert_eq!(game.state().questions_in_round, 0);
        assert_eq!(game.state().wrong_answers_in_round, 0);
        assert_eq!(game.state().score, 500);

        assert!(game.start_level());
        assert_eq!(game.state().used_problems.len(), 1);
        let value = answer(&game);
        game.submit_answer(value);
        assert_eq!(game.state().score, 700);
    }

    #[test]
    fn test_third_mistake_runs_sickness_to_game_over() {
        let mut game = playing(6);
        for _ in 0..2 {
            let value = wrong(&game);
            game.submit_answer(value);
        }
        let value = wrong(&game);
        assert_eq!(game.submit_answer(value), AnswerOutcome::Sick);
        assert_eq!(game.state().phase, GamePhase::Sick);
        assert_eq!(game.state().sickness_phase, 0);

        for phase in 1..=4u8 {
            game.advance(500);
            assert_eq!(game.state().sickness_phase, phase);
            assert!(!game.state().is_game_over());
        }

        // 15 ticks of 20 to reach 300
        game.advance(1400);
        assert_eq!(game.state().departure_offset, 280);
        game.advance(100);
        assert_eq!(game.state().departure_offset, 300);
        assert!(game.state().departure_timer.is_none());

        game.advance(499);
        assert!(!game.state().is_game_over());
        game.advance(1);
        assert!(game.state().is_game_over());
        assert_eq!(game.state().departure_offset, 300);
        assert_eq!(game.scheduler().pending(), 0);
    }

    #[test]
    fn test_answers_ignored_while_sick() {
        let mut game = playing(7);
        for _ in 0..3 {
            let value = wrong(&game);
            game.submit_answer(value);
        }
        let value = answer(&game);
        assert_eq!(
            game.submit_answer(value),
            AnswerOutcome::Ignored(IgnoreReason::Sick)
        );
        assert!(!game.begin_drag());
        game.settle();
        assert_eq!(
            game.submit_answer(value),
            AnswerOutcome::Ignored(IgnoreReason::GameOver)
        );
        assert_eq!(game.state().score, 0);
    }

    #[test]
    fn test_reset_discards_pending_timers() {
        let mut game = playing(8);
        let value = answer(&game);
        game.submit_answer(value);
        game.reset();
        assert!(game.start_level());
        let problem = game.state().problem;

        // The old NextProblem timer fires here and must not replace the problem
        game.advance(1500);
        assert_eq!(game.state().problem, problem);
        assert_eq!(game.state().phase, GamePhase::Playing);
        assert_eq!(game.state().score, 0);
    }

    #[test]
    fn test_reset_during_departure_stops_tick() {
        let mut game = playing(9);
        for _ in 0..3 {
            let value = wrong(&game);
            game.submit_answer(value);
        }
        game.advance(2300);
        assert!(game.state().departure_offset > 0);
        game.reset();
        game.settle();
        assert_eq!(game.state().departure_offset, 0);
        assert!(game.state().showing_level_intro());
        assert_eq!(game.scheduler().pending(), 0);
    }

    #[test]
    fn test_drag_opens_mouth_only_while_playing() {
        let mut game = Game::new(10);
        assert!(!game.begin_drag());
        game.start_level();
        assert!(game.begin_drag());
        assert!(game.state().mouth_open);
        game.end_drag();
        assert!(!game.state().mouth_open);
        game.begin_drag();
        let value = answer(&game);
        game.submit_answer(value);
        assert!(!game.state().mouth_open);
    }

    #[test]
    fn test_determinism() {
        let mut a = playing(12345);
        let mut b = playing(12345);
        for _ in 0..4 {
            let va = answer(&a);
            let vb = answer(&b);
            a.submit_answer(va);
            b.submit_answer(vb);
            a.advance(1500);
            b.advance(1500);
            assert_eq!(a.state(), b.state());
        }
    }
}
