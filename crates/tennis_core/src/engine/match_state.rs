//! Match State
//!
//! Mutable score bookkeeping owned by a single [`MatchStateMachine`]. The
//! state machine is the only writer; everything else (probability model,
//! point log) reads it.
//!
//! [`MatchStateMachine`]: super::state_machine::MatchStateMachine

use serde::{Deserialize, Serialize};

use super::point_log::PointRecord;
use crate::player::{PerSide, Side};

/// Aces and double faults served by one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServeStats {
    pub aces: u32,
    pub double_faults: u32,
}

impl std::ops::AddAssign for ServeStats {
    fn add_assign(&mut self, rhs: Self) {
        self.aces += rhs.aces;
        self.double_faults += rhs.double_faults;
    }
}

/// Short-term streak of consecutive points won by the same side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Momentum {
    /// Winner of the previous point in the current game.
    pub holder: Option<Side>,
    /// Consecutive points won by `holder`.
    pub streak: u32,
}

impl Momentum {
    pub fn record(&mut self, winner: Side) {
        if self.holder == Some(winner) {
            self.streak += 1;
        } else {
            self.holder = Some(winner);
            self.streak = 1;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_held_by(&self, side: Side) -> bool {
        self.holder == Some(side)
    }
}

/// Summary of one completed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRecord {
    pub winner: Side,
    /// Final games, including the game awarded for a tiebreak.
    pub games: PerSide<u32>,
    pub tiebreak: bool,
    pub serve_stats: PerSide<ServeStats>,
}

/// Full score and serve bookkeeping for one match in progress.
#[derive(Debug, Clone)]
pub struct MatchState {
    pub sets: PerSide<u32>,
    pub games: PerSide<u32>,
    pub points: PerSide<u32>,
    pub server: Side,

    pub is_tiebreak: bool,
    /// Points played in the current tiebreak; drives serve rotation only.
    pub tiebreak_points_played: u32,
    /// Who served the first point of the current tiebreak.
    pub tiebreak_first_server: Option<Side>,

    pub momentum: Momentum,
    pub last_point_was_ace: bool,

    /// Current-game counters. Outside a tiebreak only the server's entry moves.
    pub game_serve_stats: PerSide<ServeStats>,
    /// Accumulated over the current set, moved into `set_history` at set end.
    pub set_serve_stats: PerSide<ServeStats>,
    /// Running match totals, independent of `set_history`.
    pub match_serve_stats: PerSide<ServeStats>,

    pub set_history: Vec<SetRecord>,
    pub point_log: Vec<PointRecord>,
    pub total_points: u64,
}

impl MatchState {
    pub fn new(first_server: Side) -> Self {
        Self {
            sets: PerSide::default(),
            games: PerSide::default(),
            points: PerSide::default(),
            server: first_server,
            is_tiebreak: false,
            tiebreak_points_played: 0,
            tiebreak_first_server: None,
            momentum: Momentum::default(),
            last_point_was_ace: false,
            game_serve_stats: PerSide::default(),
            set_serve_stats: PerSide::default(),
            match_serve_stats: PerSide::default(),
            set_history: Vec::new(),
            point_log: Vec::new(),
            total_points: 0,
        }
    }

    pub fn receiver(&self) -> Side {
        self.server.opponent()
    }

    pub fn switch_server(&mut self) {
        self.server = self.server.opponent();
    }

    /// Points of `side` minus points of its opponent in the current game.
    pub fn point_diff(&self, side: Side) -> i64 {
        self.points[side] as i64 - self.points[side.opponent()] as i64
    }

    pub fn game_diff(&self, side: Side) -> i64 {
        self.games[side] as i64 - self.games[side.opponent()] as i64
    }

    pub fn set_diff(&self, side: Side) -> i64 {
        self.sets[side] as i64 - self.sets[side.opponent()] as i64
    }

    /// Credit an ace or double fault to `server` on every counter level.
    pub fn record_serve_event(&mut self, server: Side, ace: bool) {
        for stats in [
            &mut self.game_serve_stats[server],
            &mut self.set_serve_stats[server],
            &mut self.match_serve_stats[server],
        ] {
            if ace {
                stats.aces += 1;
            } else {
                stats.double_faults += 1;
            }
        }
    }

    /// Clears per-game counters at the start of a new game or tiebreak.
    pub fn begin_game(&mut self) {
        self.points = PerSide::default();
        self.momentum.reset();
        self.last_point_was_ace = false;
        self.game_serve_stats = PerSide::default();
    }

    /// Sum of every completed set's serve counters.
    pub fn history_totals(&self) -> PerSide<ServeStats> {
        let mut totals = PerSide::<ServeStats>::default();
        for set in &self.set_history {
            totals += set.serve_stats;
        }
        totals
    }
}
