//! Probability calculation utilities for match simulation
//!
//! All functions are pure - they take the match state and the static player
//! parameters and return a probability. This allows easy unit testing
//! without driving a full match.
//!
//! Only [`ace_probability`] influences point outcomes. The remaining values
//! are heuristics that annotate the point log.

use serde::{Deserialize, Serialize};

use super::match_state::MatchState;
use crate::player::{PerSide, Player, Side};

// ============================================================================
// Tuning constants
// ============================================================================

/// Upper bound on the per-point ace probability.
pub const ACE_PROB_CAP: f64 = 0.3;

mod ace {
    pub const SCORE_WEIGHT: f64 = 0.01;
    pub const STREAK_STEP: f64 = 0.005;
    pub const STREAK_CAP: f64 = 0.02;
    pub const AFTER_ACE_BONUS: f64 = 0.02;
}

mod next_point {
    pub const SCORE_WEIGHT: f64 = 0.02;
    pub const STREAK_STEP: f64 = 0.01;
    pub const STREAK_CAP: f64 = 0.05;
    pub const ACE_BONUS: f64 = 0.03;
    pub const DOUBLE_FAULT_PENALTY: f64 = 0.03;
}

const GAME_POINT_WEIGHT: f64 = 0.05;
const SET_GAME_WEIGHT: f64 = 0.05;
const MATCH_SET_WEIGHT: f64 = 0.1;
const MATCH_GAME_WEIGHT: f64 = 0.01;

#[inline]
fn clamp_unit(p: f64) -> f64 {
    p.clamp(0.0, 1.0)
}

/// Serve-win base rate from the point of view of `side`.
#[inline]
fn base_rate(state: &MatchState, players: &PerSide<Player>, side: Side) -> f64 {
    let serve_win = players[state.server].serve_win_prob;
    if side == state.server {
        serve_win
    } else {
        1.0 - serve_win
    }
}

// ============================================================================
// Point-level probabilities
// ============================================================================

/// Probability that the next serve is an ace.
pub fn ace_probability(state: &MatchState, players: &PerSide<Player>) -> f64 {
    let server = state.server;
    let score_adjustment = ace::SCORE_WEIGHT * state.point_diff(server) as f64;

    let momentum_adjustment = if state.momentum.is_held_by(server) {
        (ace::STREAK_STEP * state.momentum.streak as f64).min(ace::STREAK_CAP)
    } else {
        0.0
    };

    let recent_ace_adjustment = if state.last_point_was_ace {
        ace::AFTER_ACE_BONUS
    } else {
        0.0
    };

    (players[server].ace_prob + score_adjustment + momentum_adjustment + recent_ace_adjustment)
        .clamp(0.0, ACE_PROB_CAP)
}

/// Probability that `side` wins the next point.
pub fn next_point_win_probability(
    state: &MatchState,
    players: &PerSide<Player>,
    side: Side,
) -> f64 {
    let score_adjustment = next_point::SCORE_WEIGHT * state.point_diff(side) as f64;

    let swing = (next_point::STREAK_STEP * state.momentum.streak as f64).min(next_point::STREAK_CAP);
    let momentum_adjustment = match state.momentum.holder {
        Some(holder) if holder == side => swing,
        Some(_) => -swing,
        None => 0.0,
    };

    let stats = state.game_serve_stats[side];
    let ace_adjustment = if stats.aces > 0 { next_point::ACE_BONUS } else { 0.0 };
    let df_adjustment = if stats.double_faults > 0 {
        -next_point::DOUBLE_FAULT_PENALTY
    } else {
        0.0
    };

    clamp_unit(
        base_rate(state, players, side)
            + score_adjustment
            + momentum_adjustment
            + ace_adjustment
            + df_adjustment,
    )
}

// ============================================================================
// Game / set / match probabilities
// ============================================================================

pub fn game_win_probability(state: &MatchState, players: &PerSide<Player>, side: Side) -> f64 {
    clamp_unit(base_rate(state, players, side) + GAME_POINT_WEIGHT * state.point_diff(side) as f64)
}

pub fn set_win_probability(state: &MatchState, side: Side) -> f64 {
    clamp_unit(0.5 + SET_GAME_WEIGHT * state.game_diff(side) as f64)
}

pub fn match_win_probability(state: &MatchState, side: Side) -> f64 {
    clamp_unit(
        0.5 + MATCH_SET_WEIGHT * state.set_diff(side) as f64
            + MATCH_GAME_WEIGHT * state.game_diff(side) as f64,
    )
}

/// Step function of games played in the current set.
pub fn tiebreak_imminence_probability(state: &MatchState) -> f64 {
    match state.games.total() {
        0..=9 => 0.1,
        10 => 0.2,
        11 => 0.5,
        _ => 1.0,
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Every probability the model produces for one state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbabilitySnapshot {
    pub match_win: PerSide<f64>,
    pub set_win: PerSide<f64>,
    pub game_win: PerSide<f64>,
    pub next_point_win: PerSide<f64>,
    pub next_serve_ace: f64,
    pub tiebreak: f64,
}

impl ProbabilitySnapshot {
    pub fn capture(state: &MatchState, players: &PerSide<Player>) -> Self {
        let per_side = |f: &dyn Fn(Side) -> f64| PerSide::new(f(Side::Player1), f(Side::Player2));
        Self {
            match_win: per_side(&|s| match_win_probability(state, s)),
            set_win: per_side(&|s| set_win_probability(state, s)),
            game_win: per_side(&|s| game_win_probability(state, players, s)),
            next_point_win: per_side(&|s| next_point_win_probability(state, players, s)),
            next_serve_ace: ace_probability(state, players),
            tiebreak: tiebreak_imminence_probability(state),
        }
    }

    /// All values in a fixed order, for range checks.
    pub fn values(&self) -> [f64; 10] {
        [
            self.match_win.0[0],
            self.match_win.0[1],
            self.set_win.0[0],
            self.set_win.0[1],
            self.game_win.0[0],
            self.game_win.0[1],
            self.next_point_win.0[0],
            self.next_point_win.0[1],
            self.next_serve_ace,
            self.tiebreak,
        ]
    }
}
