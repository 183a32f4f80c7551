//! Parallel batch execution and result aggregation.

pub mod orchestrator;
pub mod summary;

pub use orchestrator::{match_rng, plan_batches, BatchOrchestrator, BatchPlan, PointLogSink};
pub use summary::{BatchFailure, BatchSummary, SimulationReport};
