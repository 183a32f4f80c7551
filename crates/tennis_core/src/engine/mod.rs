//! Match simulation engine
//!
//! Layered the same way a single match is played:
//! - `probability` - stateless probability model over a match state
//! - `scoring` - game/set/tiebreak rules and score display
//! - `match_state` - mutable score bookkeeping
//! - `state_machine` - point-by-point transitions
//! - `runner` - drives one match to completion

pub mod match_state;
pub mod point_log;
pub mod probability;
pub mod runner;
pub mod scoring;
pub mod state_machine;

pub use match_state::{MatchState, Momentum, ServeStats, SetRecord};
pub use point_log::{header_for, BatchLog, PointRecord, POINT_LOG_COLUMNS};
pub use probability::ProbabilitySnapshot;
pub use runner::{MatchOutcome, MatchRunner};
pub use state_machine::{MatchPhase, MatchStateMachine, PointKind, PointOutcome};
