//! Match State Machine
//!
//! Drives a single match one point at a time:
//!
//! ```text
//!   InGame ──game won──▶ InGame
//!     │  └──6-6────────▶ InTiebreak ──breaker won──┐
//!     └──set won───────────────────────────────────┴─▶ SetComplete ──next point──▶ InGame
//!                                                    └─▶ MatchComplete
//! ```
//!
//! Each point is resolved with independent uniform draws, first matching
//! branch wins: ace, double fault, serve won, return won. Only the ace
//! branch uses the adjusted model probability; the other two use the
//! server's static parameters.
//!
//! Every call to [`MatchStateMachine::play_point`] appends exactly one
//! [`PointRecord`] to the point log, including the point that ends a game,
//! a set or the match.

use rand::Rng;
use tracing::{debug, trace};

use super::match_state::{MatchState, SetRecord};
use super::point_log::PointRecord;
use super::probability::{ace_probability, ProbabilitySnapshot};
use super::scoring::{self, SET_LABEL};
use crate::config::{MatchConfig, DEFAULT_MAX_POINTS, GAMES_PER_SET};
use crate::error::{Result, SimError};
use crate::player::{PerSide, Player, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    InGame,
    InTiebreak,
    /// A set just ended; the next point opens a new set.
    SetComplete,
    MatchComplete,
}

/// How a point was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    Ace,
    DoubleFault,
    ServeWon,
    ReturnWon,
}

impl PointKind {
    /// Whether the server took the point.
    pub fn server_won(self) -> bool {
        matches!(self, PointKind::Ace | PointKind::ServeWon)
    }
}

/// Result of one [`MatchStateMachine::play_point`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointOutcome {
    pub server: Side,
    pub winner: Side,
    pub kind: PointKind,
    pub game_over: bool,
    pub set_over: bool,
    pub match_over: bool,
}

pub struct MatchStateMachine<'a> {
    players: &'a PerSide<Player>,
    config: MatchConfig,
    state: MatchState,
    phase: MatchPhase,
    max_points: u64,
}

impl<'a> MatchStateMachine<'a> {
    /// Players and config are expected to be validated by the caller.
    pub fn new(players: &'a PerSide<Player>, config: MatchConfig, first_server: Side) -> Self {
        Self {
            players,
            config,
            state: MatchState::new(first_server),
            phase: MatchPhase::InGame,
            max_points: DEFAULT_MAX_POINTS,
        }
    }

    /// Abort with [`SimError::PointCapExceeded`] once `cap` points were played.
    pub fn with_point_cap(mut self, cap: u64) -> Self {
        self.max_points = cap;
        self
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn into_state(self) -> MatchState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.phase == MatchPhase::MatchComplete
    }

    /// The match winner, once the match is complete.
    pub fn winner(&self) -> Option<Side> {
        if !self.is_complete() {
            return None;
        }
        let needed = self.config.sets_to_win();
        Side::BOTH.into_iter().find(|&s| self.state.sets[s] == needed)
    }

    /// Play a single point and apply every resulting transition.
    pub fn play_point<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<PointOutcome> {
        match self.phase {
            MatchPhase::MatchComplete => {
                return Err(SimError::InvariantViolation(
                    "point requested after match completion".to_string(),
                ))
            }
            MatchPhase::SetComplete => self.start_next_set(),
            MatchPhase::InGame | MatchPhase::InTiebreak => {}
        }
        if self.state.total_points >= self.max_points {
            return Err(SimError::PointCapExceeded {
                cap: self.max_points,
            });
        }

        let server = self.state.server;
        let kind = self.resolve_point(rng);
        let winner = if kind.server_won() {
            server
        } else {
            server.opponent()
        };
        self.apply_point(server, winner, kind);

        let mut outcome = PointOutcome {
            server,
            winner,
            kind,
            game_over: false,
            set_over: false,
            match_over: false,
        };
        let mut entering_tiebreak = false;

        if self.state.is_tiebreak {
            let target = self.config.tiebreak_target(&self.state.sets);
            let (a, b) = (self.state.points[Side::Player1], self.state.points[Side::Player2]);
            if scoring::is_tiebreak_won(a, b, target) {
                self.state.games[winner] += 1;
                outcome.game_over = true;
                outcome.set_over = true;
                self.finish_set(winner, true);
            }
        } else {
            let (a, b) = (self.state.points[Side::Player1], self.state.points[Side::Player2]);
            if scoring::is_game_won(a, b) {
                self.state.games[winner] += 1;
                outcome.game_over = true;
                let (ga, gb) = (self.state.games[Side::Player1], self.state.games[Side::Player2]);
                if scoring::is_set_won(ga, gb) {
                    outcome.set_over = true;
                    self.finish_set(winner, false);
                } else if scoring::is_tiebreak_due(ga, gb) {
                    entering_tiebreak = true;
                }
            }
        }
        outcome.match_over = self.phase == MatchPhase::MatchComplete;

        self.check_invariants()?;
        self.log_point(outcome.set_over);

        if outcome.game_over && !outcome.set_over {
            if entering_tiebreak {
                self.enter_tiebreak();
            } else {
                self.state.switch_server();
                self.state.begin_game();
            }
        }

        Ok(outcome)
    }

    fn resolve_point<R: Rng + ?Sized>(&self, rng: &mut R) -> PointKind {
        let server = &self.players[self.state.server];
        if rng.gen::<f64>() < ace_probability(&self.state, self.players) {
            PointKind::Ace
        } else if rng.gen::<f64>() < server.double_fault_prob {
            PointKind::DoubleFault
        } else if rng.gen::<f64>() < server.serve_win_prob {
            PointKind::ServeWon
        } else {
            PointKind::ReturnWon
        }
    }

    fn apply_point(&mut self, server: Side, winner: Side, kind: PointKind) {
        let state = &mut self.state;
        state.total_points += 1;
        state.points[winner] += 1;
        state.momentum.record(winner);
        state.last_point_was_ace = kind == PointKind::Ace;
        match kind {
            PointKind::Ace => state.record_serve_event(server, true),
            PointKind::DoubleFault => state.record_serve_event(server, false),
            PointKind::ServeWon | PointKind::ReturnWon => {}
        }

        // Tiebreak serve pattern: switch after the first point, then every two.
        if state.is_tiebreak {
            state.tiebreak_points_played += 1;
            if state.tiebreak_points_played % 2 == 1 {
                state.switch_server();
            }
        }
    }

    fn log_point(&mut self, set_over: bool) {
        let point_score = if set_over {
            SET_LABEL.to_string()
        } else {
            scoring::point_display(&self.state)
        };
        let scores = [
            point_score,
            scoring::game_display(&self.state),
            scoring::set_display(&self.state),
        ];
        let probs = ProbabilitySnapshot::capture(&self.state, self.players);
        let record = PointRecord::new(
            &self.players[self.state.server].name,
            &self.players[self.state.receiver()].name,
            scores,
            &probs,
        );
        self.state.point_log.push(record);
    }

    fn enter_tiebreak(&mut self) {
        trace!(server = ?self.state.server, "entering tiebreak");
        self.state.is_tiebreak = true;
        self.state.tiebreak_points_played = 0;
        self.state.tiebreak_first_server = Some(self.state.server);
        self.state.begin_game();
        self.phase = MatchPhase::InTiebreak;
    }

    fn finish_set(&mut self, winner: Side, tiebreak: bool) {
        self.state.sets[winner] += 1;
        let record = SetRecord {
            winner,
            games: self.state.games,
            tiebreak,
            serve_stats: self.state.set_serve_stats,
        };
        trace!(?winner, games = ?record.games.0, tiebreak, "set complete");
        self.state.set_history.push(record);
        self.state.set_serve_stats = PerSide::default();

        self.phase = if self.state.sets[winner] == self.config.sets_to_win() {
            debug!(
                ?winner,
                sets = ?self.state.sets.0,
                points = self.state.total_points,
                "match complete"
            );
            MatchPhase::MatchComplete
        } else {
            MatchPhase::SetComplete
        };
    }

    /// Reset the board for a new set and hand the serve over.
    fn start_next_set(&mut self) {
        match self.state.tiebreak_first_server.take() {
            // The player who received first in the breaker opens the next set.
            Some(first) => self.state.server = first.opponent(),
            None => self.state.switch_server(),
        }
        self.state.games = PerSide::default();
        self.state.is_tiebreak = false;
        self.state.tiebreak_points_played = 0;
        self.state.begin_game();
        self.phase = MatchPhase::InGame;
    }

    fn check_invariants(&self) -> Result<()> {
        let sets = &self.state.sets;
        let needed = self.config.sets_to_win();
        if sets.total() > self.config.best_of {
            return Err(SimError::InvariantViolation(format!(
                "{} sets played in a best-of-{} match",
                sets.total(),
                self.config.best_of
            )));
        }
        if sets.0.iter().any(|&s| s > needed) {
            return Err(SimError::InvariantViolation(format!(
                "set score {:?} exceeds the {} sets needed to win",
                sets.0, needed
            )));
        }
        if sets.0.iter().all(|&s| s == needed) {
            return Err(SimError::InvariantViolation(
                "both players reached the winning set count".to_string(),
            ));
        }
        if self.state.games.0.iter().any(|&g| g > GAMES_PER_SET + 1) {
            return Err(SimError::InvariantViolation(format!(
                "game score {:?} is past the set limit",
                self.state.games.0
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn dominant_pair() -> PerSide<Player> {
        PerSide::new(
            Player::new("A", 1.0, 0.0, 0.0),
            Player::new("B", 0.0, 0.0, 0.0),
        )
    }

    /// Every serve is held; sets always reach a tiebreak.
    fn holders() -> PerSide<Player> {
        PerSide::new(
            Player::new("A", 1.0, 0.0, 0.0),
            Player::new("B", 1.0, 0.0, 0.0),
        )
    }

    fn play_out(machine: &mut MatchStateMachine<'_>, rng: &mut ChaCha8Rng) -> Vec<PointOutcome> {
        let mut outcomes = Vec::new();
        while !machine.is_complete() {
            outcomes.push(machine.play_point(rng).unwrap());
        }
        outcomes
    }

    #[test]
    fn test_dominant_player_wins_love_games_and_sets() {
        let players = dominant_pair();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut machine = MatchStateMachine::new(&players, MatchConfig::new(3, false), Side::Player2);
        let outcomes = play_out(&mut machine, &mut rng);

        assert_eq!(machine.winner(), Some(Side::Player1));
        // 2 sets x 6 games x 4 points.
        assert_eq!(outcomes.len(), 48);
        assert!(outcomes.iter().all(|o| o.winner == Side::Player1));

        let state = machine.state();
        assert_eq!(state.sets, PerSide::new(2, 0));
        assert_eq!(state.set_history.len(), 2);
        for set in &state.set_history {
            assert_eq!(set.games, PerSide::new(6, 0));
            assert!(!set.tiebreak);
        }
    }

    #[test]
    fn test_server_alternates_each_game() {
        let players = dominant_pair();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut machine = MatchStateMachine::new(&players, MatchConfig::new(1, false), Side::Player1);
        let outcomes = play_out(&mut machine, &mut rng);

        let servers: Vec<Side> = outcomes.chunks(4).map(|game| game[0].server).collect();
        for pair in servers.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        for game in outcomes.chunks(4) {
            assert!(game.iter().all(|o| o.server == game[0].server));
        }
    }

    #[test]
    fn test_point_log_one_record_per_point() {
        let players = dominant_pair();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut machine = MatchStateMachine::new(&players, MatchConfig::new(3, false), Side::Player1);
        let outcomes = play_out(&mut machine, &mut rng);
        let log = &machine.state().point_log;

        assert_eq!(log.len(), outcomes.len());
        assert_eq!(log[0].point_score, "15-0");
        assert_eq!(log[3].point_score, "GAME");
        assert_eq!(log[3].game_score, "1-0");
        // Second game: B serves and trails.
        assert_eq!(log[4].server, "B");
        assert_eq!(log[4].point_score, "0-15");
        // Set-ending point.
        assert_eq!(log[23].point_score, "SET");
        assert_eq!(log.last().unwrap().point_score, "SET");
    }

    #[test]
    fn test_holders_reach_tiebreak_and_rotate_serve() {
        let players = holders();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut machine = MatchStateMachine::new(&players, MatchConfig::new(1, false), Side::Player1);

        // 12 service games of 4 points each.
        for _ in 0..48 {
            machine.play_point(&mut rng).unwrap();
        }
        assert_eq!(machine.phase(), MatchPhase::InTiebreak);
        assert_eq!(machine.state().games, PerSide::new(6, 6));
        assert_eq!(machine.state().points, PerSide::new(0, 0));
        // No serve change across the tiebreak boundary: B served game 12.
        assert_eq!(machine.state().server, Side::Player2);
        assert_eq!(machine.state().tiebreak_first_server, Some(Side::Player2));

        // Breaker servers: B, A, A, B, B, A, A, ...
        let expected = [
            Side::Player2,
            Side::Player1,
            Side::Player1,
            Side::Player2,
            Side::Player2,
            Side::Player1,
            Side::Player1,
        ];
        let served: Vec<Side> = (0..expected.len())
            .map(|_| machine.play_point(&mut rng).unwrap().server)
            .collect();
        assert_eq!(served, expected);
        // Holders trade points, so nobody is two clear yet.
        assert_eq!(machine.phase(), MatchPhase::InTiebreak);
        assert_eq!(machine.state().tiebreak_points_played, 7);
    }

    #[test]
    fn test_tiebreak_ends_with_two_point_margin() {
        let players = PerSide::new(
            Player::new("A", 0.5, 0.0, 0.0),
            Player::new("B", 0.5, 0.0, 0.0),
        );
        for seed in 0..40 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut machine =
                MatchStateMachine::new(&players, MatchConfig::new(5, true), Side::Player1);
            let mut breaker_points = PerSide::<u32>::default();
            while !machine.is_complete() {
                let in_breaker = machine.phase() == MatchPhase::InTiebreak;
                let final_set = machine.config().is_final_set(&machine.state().sets);
                let outcome = machine.play_point(&mut rng).unwrap();
                if !in_breaker {
                    continue;
                }
                breaker_points[outcome.winner] += 1;
                if outcome.set_over {
                    let target = if final_set { 10 } else { 7 };
                    let (a, b) = (breaker_points.0[0], breaker_points.0[1]);
                    assert!(a.max(b) >= target);
                    assert!(a.abs_diff(b) >= 2);
                    assert!(a.max(b) == target || a.abs_diff(b) == 2);
                    breaker_points = PerSide::default();
                } else {
                    let (a, b) = (breaker_points.0[0], breaker_points.0[1]);
                    let target = if final_set { 10 } else { 7 };
                    assert!(!(a.max(b) >= target && a.abs_diff(b) >= 2));
                }
            }
        }
    }

    #[test]
    fn test_new_set_after_tiebreak_opened_by_first_receiver() {
        let players = PerSide::new(
            Player::new("A", 0.9, 0.0, 0.0),
            Player::new("B", 0.9, 0.0, 0.0),
        );
        let mut checked = 0;
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut machine =
                MatchStateMachine::new(&players, MatchConfig::new(3, false), Side::Player1);
            while machine.phase() != MatchPhase::SetComplete {
                machine.play_point(&mut rng).unwrap();
            }
            let Some(first) = machine.state().tiebreak_first_server else {
                continue;
            };
            assert!(machine.state().set_history[0].tiebreak);
            let outcome = machine.play_point(&mut rng).unwrap();
            assert_eq!(outcome.server, first.opponent());
            assert_eq!(machine.state().games.total(), 0);
            assert!(!machine.state().is_tiebreak);
            checked += 1;
        }
        assert!(checked > 0, "no opening set went to a tiebreak");
    }

    #[test]
    fn test_point_after_completion_is_rejected() {
        let players = dominant_pair();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut machine = MatchStateMachine::new(&players, MatchConfig::new(1, false), Side::Player1);
        play_out(&mut machine, &mut rng);
        let err = machine.play_point(&mut rng).unwrap_err();
        assert!(matches!(err, SimError::InvariantViolation(_)));
    }

    #[test]
    fn test_point_cap_aborts_match() {
        let players = holders();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut machine = MatchStateMachine::new(&players, MatchConfig::new(3, false), Side::Player1)
            .with_point_cap(10);
        for _ in 0..10 {
            machine.play_point(&mut rng).unwrap();
        }
        assert_eq!(
            machine.play_point(&mut rng),
            Err(SimError::PointCapExceeded { cap: 10 })
        );
    }

    #[test]
    fn test_double_faults_hand_points_to_receiver() {
        let players = PerSide::new(
            Player::new("A", 1.0, 0.0, 1.0),
            Player::new("B", 1.0, 0.0, 1.0),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut machine = MatchStateMachine::new(&players, MatchConfig::new(1, false), Side::Player1);
        let outcome = machine.play_point(&mut rng).unwrap();
        assert_eq!(outcome.kind, PointKind::DoubleFault);
        assert_eq!(outcome.winner, Side::Player2);
        assert_eq!(machine.state().game_serve_stats[Side::Player1].double_faults, 1);
        assert_eq!(machine.state().game_serve_stats[Side::Player2].double_faults, 0);
    }

    #[test]
    fn test_running_totals_match_set_history() {
        let players = PerSide::new(
            Player::new("A", 0.64, 0.12, 0.06),
            Player::new("B", 0.61, 0.09, 0.05),
        );
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut machine =
                MatchStateMachine::new(&players, MatchConfig::new(5, true), Side::Player1);
            play_out(&mut machine, &mut rng);
            let state = machine.state();
            assert_eq!(state.history_totals(), state.match_serve_stats);
        }
    }
}
