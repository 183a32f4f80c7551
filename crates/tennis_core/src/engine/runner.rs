//! Single-match driver.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::match_state::{ServeStats, SetRecord};
use super::point_log::PointRecord;
use super::state_machine::MatchStateMachine;
use crate::config::{MatchConfig, DEFAULT_MAX_POINTS};
use crate::error::{ConfigError, Result, SimError};
use crate::player::{validate_pair, PerSide, Player, Side};

/// Everything a completed match reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: Side,
    pub first_server: Side,
    pub final_sets: PerSide<u32>,
    /// Points played, one shot per point.
    pub total_points: u64,
    pub point_log: Vec<PointRecord>,
    pub set_history: Vec<SetRecord>,
    /// Summed across `set_history`.
    pub aces: PerSide<u32>,
    pub double_faults: PerSide<u32>,
}

/// Runs matches between a fixed, validated pair of players.
#[derive(Debug, Clone)]
pub struct MatchRunner {
    players: PerSide<Player>,
    config: MatchConfig,
    point_cap: u64,
}

impl MatchRunner {
    /// Fails fast on any configuration problem; nothing is simulated.
    pub fn new(players: PerSide<Player>, config: MatchConfig) -> std::result::Result<Self, ConfigError> {
        validate_pair(&players)?;
        config.validate()?;
        Ok(Self {
            players,
            config,
            point_cap: DEFAULT_MAX_POINTS,
        })
    }

    pub fn with_point_cap(mut self, cap: u64) -> Self {
        self.point_cap = cap;
        self
    }

    pub fn players(&self) -> &PerSide<Player> {
        &self.players
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Play one match with a randomly chosen first server.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<MatchOutcome> {
        let first_server = if rng.gen_bool(0.5) {
            Side::Player1
        } else {
            Side::Player2
        };
        self.run_from(first_server, rng)
    }

    /// Play one match with a fixed first server.
    pub fn run_from<R: Rng + ?Sized>(&self, first_server: Side, rng: &mut R) -> Result<MatchOutcome> {
        let mut machine = MatchStateMachine::new(&self.players, self.config, first_server)
            .with_point_cap(self.point_cap);
        while !machine.is_complete() {
            machine.play_point(rng)?;
        }
        let winner = machine.winner().ok_or_else(|| {
            SimError::InvariantViolation("completed match has no winner".to_string())
        })?;

        let state = machine.into_state();
        let totals: PerSide<ServeStats> = state.history_totals();
        Ok(MatchOutcome {
            winner,
            first_server,
            final_sets: state.sets,
            total_points: state.total_points,
            point_log: state.point_log,
            set_history: state.set_history,
            aces: totals.map(|s| s.aces),
            double_faults: totals.map(|s| s.double_faults),
        })
    }
}
