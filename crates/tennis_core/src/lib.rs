//! # tennis_core - Point-by-Point Tennis Match Simulation Engine
//!
//! Monte Carlo simulator that plays tennis matches point by point under a
//! parametric serve model and annotates every point with heuristic
//! win probabilities (match, set, game, next point, ace, tiebreak).
//!
//! ## Features
//! - Full game / set / tiebreak rules, optional 10-point deciding breaker
//! - Reproducible runs: one ChaCha8 stream per match, derived from a seed
//! - Batches run in parallel on a rayon pool; failed batches are isolated
//! - Stable point-log records for external sinks (CSV, etc.)
//!
//! ```rust
//! use tennis_core::{BatchOrchestrator, EngineConfig};
//!
//! let mut config = EngineConfig::quick();
//! config.simulation.simulations = 20;
//! config.simulation.seed = Some(7);
//!
//! let report = BatchOrchestrator::from_config(&config)
//!     .unwrap()
//!     .run(None)
//!     .unwrap();
//! assert_eq!(report.completed(), 20);
//! ```

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod player;

pub use batch::{BatchOrchestrator, BatchSummary, PointLogSink, SimulationReport};
pub use config::{EngineConfig, MatchConfig, SimulationConfig};
pub use engine::{BatchLog, MatchOutcome, MatchRunner, MatchStateMachine, PointRecord};
pub use error::{ConfigError, Result, SimError, SinkError};
pub use player::{PerSide, Player, Side};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
