//! Data-driven game balance
//!
//! Every number the round state machine and the sickness sequence depend on.
//! `Tuning::default()` reproduces the classic game; a JSON file can override
//! any subset of fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors produced while loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("tuning field `{0}` must be greater than zero")]
    Zero(&'static str),
}

/// Balance and timing knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Round ===
    pub questions_per_round: u32,
    pub max_mistakes: u32,
    pub points_per_level: u64,

    // === Delays (ms) ===
    pub next_problem_delay_ms: u64,
    pub level_advance_delay_ms: u64,
    pub anger_duration_ms: u64,

    // === Sickness ===
    pub sickness_phase_interval_ms: u64,
    pub departure_tick_ms: u64,
    pub departure_step: u32,
    pub departure_distance: u32,
    pub game_over_delay_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            questions_per_round: QUESTIONS_PER_ROUND,
            max_mistakes: MAX_MISTAKES,
            points_per_level: POINTS_PER_LEVEL,

            next_problem_delay_ms: NEXT_PROBLEM_DELAY_MS,
            level_advance_delay_ms: LEVEL_ADVANCE_DELAY_MS,
            anger_duration_ms: ANGER_DURATION_MS,

            sickness_phase_interval_ms: SICKNESS_PHASE_INTERVAL_MS,
            departure_tick_ms: DEPARTURE_TICK_MS,
            departure_step: DEPARTURE_STEP,
            departure_distance: DEPARTURE_DISTANCE,
            game_over_delay_ms: GAME_OVER_DELAY_MS,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall the state machine
    pub fn validate(&self) -> Result<(), TuningError> {
        let counts = [
            ("questions_per_round", self.questions_per_round as u64),
            ("max_mistakes", self.max_mistakes as u64),
            ("departure_tick_ms", self.departure_tick_ms),
            ("departure_step", self.departure_step as u64),
            ("departure_distance", self.departure_distance as u64),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, v)| *v == 0) {
            return Err(TuningError::Zero(*name));
        }
        Ok(())
    }

    /// Number of departure ticks before the character is off screen
    pub fn departure_ticks(&self) -> u32 {
        self.departure_distance.div_ceil(self.departure_step.max(1))
    }

    /// Delay from the third mistake to the given sickness phase
    pub fn sickness_phase_delay_ms(&self, phase: u8) -> u64 {
        self.sickness_phase_interval_ms * phase as u64
    }
}
