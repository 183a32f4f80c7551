//! # Engine Configuration
//!
//! All knobs for a simulation run live here: the two players, the match
//! format and the batch parameters. Every section deserializes from YAML
//! with per-field defaults, so a config file only needs to name what it
//! changes.
//!
//! ```rust
//! use tennis_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let quick = EngineConfig::quick();
//! assert_eq!(quick.simulation.simulations, 100);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::player::{validate_pair, PerSide, Player, Side};

/// Standard tiebreak length.
pub const TIEBREAK_POINTS: u32 = 7;
/// Deciding-set tiebreak length in grand-slam mode.
pub const FINAL_SET_TIEBREAK_POINTS: u32 = 10;
/// Games each side must reach before a set goes to a tiebreak.
pub const GAMES_PER_SET: u32 = 6;
/// Safety cap on points in a single match unless configured otherwise.
pub const DEFAULT_MAX_POINTS: u64 = 100_000;
/// Upper bound on batches per run; every batch is planned up front.
pub const MAX_BATCHES: u64 = 10_000_000;

/// Match format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Total sets available. Must be odd.
    pub best_of: u32,
    /// The deciding set's tiebreak plays to 10 instead of 7.
    pub grand_slam_final_set_tiebreak: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            best_of: 3,
            grand_slam_final_set_tiebreak: false,
        }
    }
}

impl MatchConfig {
    pub fn new(best_of: u32, grand_slam_final_set_tiebreak: bool) -> Self {
        Self {
            best_of,
            grand_slam_final_set_tiebreak,
        }
    }

    pub fn best_of_five_grand_slam() -> Self {
        Self::new(5, true)
    }

    /// Sets needed to win the match: `ceil(best_of / 2)`.
    pub fn sets_to_win(&self) -> u32 {
        self.best_of / 2 + 1
    }

    /// True when the set about to be (or being) played is the deciding one.
    pub fn is_final_set(&self, sets: &PerSide<u32>) -> bool {
        sets.total() + 1 == self.best_of
    }

    /// Points needed to take the tiebreak of the current set.
    pub fn tiebreak_target(&self, sets: &PerSide<u32>) -> u32 {
        if self.grand_slam_final_set_tiebreak && self.is_final_set(sets) {
            FINAL_SET_TIEBREAK_POINTS
        } else {
            TIEBREAK_POINTS
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.best_of == 0 || self.best_of % 2 == 0 {
            return Err(ConfigError::InvalidBestOf(self.best_of));
        }
        Ok(())
    }
}

/// Batch execution parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of independent matches to simulate.
    pub simulations: u64,
    /// Worker threads. 1 runs every batch on the calling thread.
    pub workers: usize,
    /// Matches per unit of scheduled work.
    pub batch_size: u64,
    /// Export point logs every time this many matches have been covered.
    pub log_interval: u64,
    /// Base seed. Each match derives its own stream from it.
    pub seed: Option<u64>,
    /// Safety cap on points in a single match.
    pub max_points_per_match: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            simulations: 10_000,
            workers: 10,
            batch_size: 10,
            log_interval: 100,
            seed: None,
            max_points_per_match: DEFAULT_MAX_POINTS,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("simulations", self.simulations),
            ("workers", self.workers as u64),
            ("batch_size", self.batch_size),
            ("log_interval", self.log_interval),
            ("max_points_per_match", self.max_points_per_match),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        let batches = self.batch_count();
        if batches > MAX_BATCHES {
            return Err(ConfigError::TooManyBatches {
                batches,
                max: MAX_BATCHES,
            });
        }
        Ok(())
    }

    /// Number of batches the run is split into. The last one may be short.
    pub fn batch_count(&self) -> u64 {
        self.simulations.div_ceil(self.batch_size)
    }
}

/// Complete run description: who plays, under which format, how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub player1: Player,
    pub player2: Player,
    #[serde(rename = "match")]
    pub match_config: MatchConfig,
    pub simulation: SimulationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            player1: Player::new("Federer", 0.65, 0.10, 0.05),
            player2: Player::new("Nadal", 0.62, 0.08, 0.04),
            match_config: MatchConfig::best_of_five_grand_slam(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Small sequential run, useful for smoke tests.
    pub fn quick() -> Self {
        let mut cfg = Self::default();
        cfg.match_config = MatchConfig::default();
        cfg.simulation.simulations = 100;
        cfg.simulation.workers = 1;
        cfg.simulation.log_interval = 100;
        cfg
    }

    /// Best of five with a 10-point deciding breaker.
    pub fn grand_slam() -> Self {
        Self::default()
    }

    pub fn players(&self) -> PerSide<Player> {
        PerSide(Side::BOTH).map(|side| self.player(side).clone())
    }

    pub fn player(&self, side: Side) -> &Player {
        match side {
            Side::Player1 => &self.player1,
            Side::Player2 => &self.player2,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pair(&self.players())?;
        self.match_config.validate()?;
        self.simulation.validate()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load_yaml(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
