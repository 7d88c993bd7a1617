//! Chungus Numbers headless entry point
//!
//! Plays runs with the autoplayer on the virtual clock and logs the outcome.
//! The browser build drives the engine through `chungus_numbers::web` instead.
//!
//! Environment:
//! - `CHUNGUS_SEED`: run seed (default: wall clock)
//! - `CHUNGUS_TUNING`: path to a tuning JSON file
//! - `CHUNGUS_ACCURACY`: autoplayer accuracy 0.0..=1.0 (default 0.85)
//! - `CHUNGUS_MAX_LEVEL`: stop once this level is reached (default 8)
//! - `CHUNGUS_RUNS`: number of runs (default 1)

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Chungus Numbers (headless) starting...");
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result, bail};

    use chungus_numbers::consts::SIM_STEP_MS;
    use chungus_numbers::sim::{AutoPlayer, Game, TimerQueue};
    use chungus_numbers::{HighScores, Tuning};

    /// Virtual time budget per run before giving up (ms)
    const MAX_RUN_MS: u64 = 60 * 60 * 1000;

    struct Options {
        seed: u64,
        tuning: Tuning,
        accuracy: f64,
        max_level: u32,
        runs: u32,
    }

    fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
    where
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match std::env::var(name) {
            Ok(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .with_context(|| format!("{name}={raw:?} is not valid")),
            Err(_) => Ok(None),
        }
    }

    fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn load_options() -> Result<Options> {
        let tuning = match std::env::var("CHUNGUS_TUNING") {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading tuning file {path}"))?;
                let tuning = Tuning::from_json(&json)
                    .with_context(|| format!("loading tuning file {path}"))?;
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(_) => Tuning::default(),
        };

        let accuracy = env_parse::<f64>("CHUNGUS_ACCURACY")?.unwrap_or(0.85);
        if !(0.0..=1.0).contains(&accuracy) {
            bail!("CHUNGUS_ACCURACY must be within 0.0..=1.0, got {accuracy}");
        }

        Ok(Options {
            seed: env_parse::<u64>("CHUNGUS_SEED")?.unwrap_or_else(now_ms),
            tuning,
            accuracy,
            max_level: env_parse::<u32>("CHUNGUS_MAX_LEVEL")?.unwrap_or(8),
            runs: env_parse::<u32>("CHUNGUS_RUNS")?.unwrap_or(1).max(1),
        })
    }

    pub fn run() -> Result<()> {
        let options = load_options()?;
        let mut board = HighScores::new();

        for run in 0..options.runs {
            let seed = options.seed.wrapping_add(run as u64);
            let mut game = Game::with_tuning(seed, options.tuning.clone(), TimerQueue::new());
            let mut player = AutoPlayer::new(options.accuracy, seed ^ 0x9e37_79b9_7f4a_7c15);
            log::info!("Run {} with seed {}", run + 1, seed);

            while !game.state().is_game_over()
                && game.state().level < options.max_level
                && game.now_ms() < MAX_RUN_MS
            {
                player.act(&mut game);
                game.advance(SIM_STEP_MS);
            }

            let view = game.snapshot();
            let ending = if view.game_over {
                "Chungus got sick"
            } else {
                "stopped"
            };
            println!(
                "Run {}: {} on level {} with score {} ({} ms virtual)",
                run + 1,
                ending,
                view.level,
                view.score,
                game.now_ms()
            );

            if let Some(rank) = board.add_score(view.score, view.level, now_ms()) {
                println!("  New high score, rank #{rank}");
            }
        }

        println!("\nHigh scores:");
        for (i, entry) in board.entries.iter().enumerate() {
            println!("{:>3}. {:>7}  level {}", i + 1, entry.score, entry.level);
        }
        Ok(())
    }
}
