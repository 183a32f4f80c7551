//! Property tests over complete simulated matches.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tennis_core::engine::probability::ACE_PROB_CAP;
use tennis_core::engine::{MatchPhase, MatchStateMachine};
use tennis_core::{MatchConfig, MatchRunner, PerSide, Player, Side};

fn player_strategy(name: &'static str) -> impl Strategy<Value = Player> {
    (0.3f64..0.9, 0.0f64..0.25, 0.0f64..0.15)
        .prop_map(move |(serve, ace, df)| Player::new(name, serve, ace, df))
}

fn config_strategy() -> impl Strategy<Value = MatchConfig> {
    (prop_oneof![Just(1u32), Just(3u32), Just(5u32)], any::<bool>())
        .prop_map(|(best_of, grand_slam)| MatchConfig::new(best_of, grand_slam))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: every logged probability stays in range for every reachable state
    #[test]
    fn prop_logged_probabilities_in_range(
        p1 in player_strategy("P1"),
        p2 in player_strategy("P2"),
        config in config_strategy(),
        seed in any::<u64>(),
    ) {
        let runner = MatchRunner::new(PerSide::new(p1, p2), config).unwrap();
        let outcome = runner.run(&mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        for record in &outcome.point_log {
            prop_assert!(record.next_serve_ace_prob >= 0.0);
            prop_assert!(record.next_serve_ace_prob <= ACE_PROB_CAP);
            for p in record.probabilities() {
                prop_assert!((0.0..=1.0).contains(&p), "probability {} out of range", p);
            }
        }
    }

    /// Property: the winner holds exactly ceil(best_of / 2) sets
    #[test]
    fn prop_winner_reaches_set_threshold(
        p1 in player_strategy("P1"),
        p2 in player_strategy("P2"),
        config in config_strategy(),
        seed in any::<u64>(),
    ) {
        let runner = MatchRunner::new(PerSide::new(p1, p2), config).unwrap();
        let outcome = runner.run(&mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        let needed = config.sets_to_win();
        prop_assert_eq!(outcome.final_sets[outcome.winner], needed);
        prop_assert!(outcome.final_sets.total() >= needed);
        prop_assert!(outcome.final_sets.total() <= config.best_of);
    }

    /// Property: set history totals equal the reported match totals
    #[test]
    fn prop_set_history_sums_to_match_totals(
        p1 in player_strategy("P1"),
        p2 in player_strategy("P2"),
        seed in any::<u64>(),
    ) {
        let players = PerSide::new(p1, p2);
        let config = MatchConfig::new(5, true);
        let mut machine = MatchStateMachine::new(&players, config, Side::Player1);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        while !machine.is_complete() {
            machine.play_point(&mut rng).unwrap();
        }
        let state = machine.state();
        prop_assert_eq!(state.history_totals(), state.match_serve_stats);

        let runner = MatchRunner::new(players.clone(), config).unwrap();
        let outcome = runner.run_from(Side::Player1, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        for side in Side::BOTH {
            let aces: u32 = outcome.set_history.iter().map(|s| s.serve_stats[side].aces).sum();
            let dfs: u32 = outcome.set_history.iter().map(|s| s.serve_stats[side].double_faults).sum();
            prop_assert_eq!(outcome.aces[side], aces);
            prop_assert_eq!(outcome.double_faults[side], dfs);
            prop_assert_eq!(outcome.aces[side], state.match_serve_stats[side].aces);
        }
    }

    /// Property: regular games end at 4+ points with a 2-point margin, never earlier
    #[test]
    fn prop_regular_games_need_two_point_margin(
        p1 in player_strategy("P1"),
        p2 in player_strategy("P2"),
        seed in any::<u64>(),
    ) {
        let players = PerSide::new(p1, p2);
        let mut machine = MatchStateMachine::new(&players, MatchConfig::new(3, false), Side::Player2);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut game = PerSide::<u32>::default();
        while !machine.is_complete() {
            let in_breaker = machine.phase() == MatchPhase::InTiebreak;
            let outcome = machine.play_point(&mut rng).unwrap();
            if in_breaker {
                continue;
            }
            game[outcome.winner] += 1;
            let (a, b) = (game.0[0], game.0[1]);
            if outcome.game_over {
                prop_assert!(a.max(b) >= 4);
                prop_assert!(a.abs_diff(b) >= 2);
                prop_assert!(a.max(b) == 4 || a.abs_diff(b) == 2);
                game = PerSide::default();
            } else {
                prop_assert!(!(a.max(b) >= 4 && a.abs_diff(b) >= 2));
            }
        }
    }

    /// Property: a tiebreak starts exactly when games reach 6-6
    #[test]
    fn prop_tiebreak_entered_only_at_six_all(
        serve in 0.75f64..0.95,
        seed in any::<u64>(),
    ) {
        let players = PerSide::new(
            Player::new("P1", serve, 0.05, 0.02),
            Player::new("P2", serve, 0.05, 0.02),
        );
        let mut machine = MatchStateMachine::new(&players, MatchConfig::new(3, true), Side::Player1);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        while !machine.is_complete() {
            let before = machine.phase();
            let outcome = machine.play_point(&mut rng).unwrap();
            let after = machine.phase();
            let games = machine.state().games;
            if before != MatchPhase::InTiebreak && after == MatchPhase::InTiebreak {
                prop_assert_eq!(games, PerSide::new(6, 6));
            }
            if outcome.game_over && !outcome.set_over && games == PerSide::new(6, 6) {
                prop_assert_eq!(after, MatchPhase::InTiebreak);
            }
            if before == MatchPhase::InTiebreak && outcome.set_over {
                prop_assert_eq!(games.total(), 13);
            }
        }
    }
}
