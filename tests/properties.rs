use std::collections::BTreeSet;

use chungus_numbers::sim::{
    DifficultyRange, Game, GamePhase, UsedProblemSet, generate_problem,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

proptest! {
    #[test]
    fn generated_problems_are_well_formed(seed in any::<u64>(), level in 1u32..12) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut used = UsedProblemSet::new();
        let range = DifficultyRange::for_level(level);

        for _ in 0..10 {
            let generated = generate_problem(level, &mut used, &mut rng);
            let answer = generated.problem.answer();
            prop_assert!(range.contains(generated.problem.num1));
            prop_assert!(range.contains(generated.problem.num2));

            let distinct: BTreeSet<u32> = generated.options.iter().collect();
            prop_assert_eq!(distinct.len(), 4);
            prop_assert!(generated.options.contains(answer));
            prop_assert!(generated.options.iter().all(|v| v > 0));
        }
        prop_assert_eq!(used.len(), 10);
    }

    #[test]
    fn no_repeats_within_a_level(seed in any::<u64>()) {
        let mut game = Game::new(seed);
        game.start_level();
        let mut seen = BTreeSet::new();

        for _ in 0..5 {
            let problem = game.state().problem.unwrap();
            prop_assert!(seen.insert(problem));
            game.submit_answer(problem.answer());
            game.settle();
        }
        prop_assert_eq!(game.state().level, 2);
    }

    #[test]
    fn round_invariants_hold(seed in any::<u64>(), picks in prop::collection::vec(any::<bool>(), 1..40)) {
        let mut game = Game::new(seed);
        let mut expected_score = 0u64;
        let mut mistakes_this_round = 0u32;

        for correct in picks {
            if game.state().showing_level_intro() {
                mistakes_this_round = 0;
                game.start_level();
            }
            if game.state().phase != GamePhase::Playing {
                break;
            }

            let answer = game.state().problem.unwrap().answer();
            let level = game.state().level as u64;
            if correct {
                game.submit_answer(answer);
                expected_score += level * 100;
            } else {
                game.submit_answer(answer + 1);
                mistakes_this_round += 1;
            }

            prop_assert!(game.state().wrong_answers_in_round <= 3);
            prop_assert_eq!(game.state().score, expected_score);
            game.settle();

            if game.state().is_game_over() {
                prop_assert_eq!(mistakes_this_round, 3);
                prop_assert_eq!(game.state().sickness_phase, 4);
            }
        }
    }
}
