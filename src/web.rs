//! Browser facade
//!
//! The page renders Chungus and forwards drag/drop and button presses here.
//! It calls `tick` from `requestAnimationFrame` with the elapsed milliseconds
//! and re-renders from the JSON snapshot.

use wasm_bindgen::prelude::*;

use crate::HighScores;
use crate::sim::Game;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Chungus Numbers starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    high_scores: HighScores,
    recorded: bool,
    /// Sub-millisecond remainder between frames
    accumulator: f64,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let seed = js_sys::Date::now() as u64;
        log::info!("Game initialized with seed: {}", seed);
        WebGame {
            game: Game::new(seed),
            high_scores: HighScores::new(),
            recorded: false,
            accumulator: 0.0,
        }
    }

    #[wasm_bindgen(js_name = startLevel)]
    pub fn start_level(&mut self) -> bool {
        self.game.start_level()
    }

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self) -> bool {
        self.game.begin_drag()
    }

    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&mut self) {
        self.game.end_drag();
    }

    /// Returns true if the answer was correct
    #[wasm_bindgen(js_name = submitAnswer)]
    pub fn submit_answer(&mut self, value: u32) -> bool {
        matches!(
            self.game.submit_answer(value),
            crate::sim::AnswerOutcome::Correct { .. }
        )
    }

    #[wasm_bindgen(js_name = resetGame)]
    pub fn reset_game(&mut self) {
        self.game.reset();
        self.recorded = false;
    }

    pub fn tick(&mut self, elapsed_ms: f64) {
        self.accumulator += elapsed_ms.max(0.0);
        let whole = self.accumulator.floor();
        self.accumulator -= whole;
        self.game.advance(whole as u64);

        let state = self.game.state();
        if state.is_game_over() && !self.recorded {
            self.high_scores
                .add_score(state.score, state.level, js_sys::Date::now() as u64);
            self.recorded = true;
        }
    }

    /// Current view model as JSON
    pub fn snapshot(&self) -> String {
        serde_json::to_string(&self.game.snapshot()).unwrap_or_default()
    }

    #[wasm_bindgen(js_name = highScores)]
    pub fn high_scores(&self) -> String {
        serde_json::to_string(&self.high_scores).unwrap_or_default()
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}
