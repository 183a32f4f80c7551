//! Batch Orchestrator
//!
//! Splits a run of N matches into batches and plays the batches on a rayon
//! pool. Batches share nothing mutable: each match owns a ChaCha8 stream
//! derived from the run seed and the match's global index, so the outcome
//! of match `i` is the same no matter which worker plays it or how the run
//! is partitioned.
//!
//! A batch that errors or panics is dropped from the totals as a whole and
//! reported in [`SimulationReport::failed_batches`].

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::summary::{BatchFailure, BatchSummary, SimulationReport};
use crate::config::{EngineConfig, MatchConfig, SimulationConfig};
use crate::engine::{BatchLog, MatchRunner};
use crate::error::{ConfigError, Result, SimError, SinkError};
use crate::player::{PerSide, Player};

/// External consumer of point logs. Called from worker threads.
pub trait PointLogSink: Send + Sync {
    fn export(&self, log: &BatchLog) -> std::result::Result<(), SinkError>;
}

/// One unit of scheduled work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    pub index: usize,
    /// Global index of the first match.
    pub first_match: u64,
    pub matches: u64,
    /// Whether the batch's point logs go to the sink.
    pub export_logs: bool,
}

impl BatchPlan {
    pub fn match_range(&self) -> std::ops::Range<u64> {
        self.first_match..self.first_match + self.matches
    }
}

/// Partition `config.simulations` into batches. Every match is covered; the
/// last batch is short when the count does not divide evenly. A batch
/// exports its logs when its range crosses a multiple of `log_interval`.
pub fn plan_batches(config: &SimulationConfig) -> Vec<BatchPlan> {
    let mut plans = Vec::new();
    let mut first_match = 0;
    while first_match < config.simulations {
        let matches = config.batch_size.min(config.simulations - first_match);
        let end = first_match + matches;
        plans.push(BatchPlan {
            index: plans.len(),
            first_match,
            matches,
            export_logs: end / config.log_interval > first_match / config.log_interval,
        });
        first_match = end;
    }
    plans
}

/// RNG for match `match_index` of a run seeded with `seed`.
pub fn match_rng(seed: u64, match_index: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(match_index);
    rng
}

pub struct BatchOrchestrator {
    runner: MatchRunner,
    config: SimulationConfig,
}

impl BatchOrchestrator {
    pub fn new(
        players: PerSide<Player>,
        match_config: MatchConfig,
        config: SimulationConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let runner = MatchRunner::new(players, match_config)?.with_point_cap(config.max_points_per_match);
        Ok(Self { runner, config })
    }

    pub fn from_config(config: &EngineConfig) -> std::result::Result<Self, ConfigError> {
        Self::new(config.players(), config.match_config, config.simulation.clone())
    }

    pub fn runner(&self) -> &MatchRunner {
        &self.runner
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every batch and merge the results.
    ///
    /// Only a failure to start the worker pool is returned as an error;
    /// failing batches are reported inside the [`SimulationReport`].
    pub fn run(&self, sink: Option<&dyn PointLogSink>) -> Result<SimulationReport> {
        let seed = self.config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let plans = plan_batches(&self.config);
        info!(
            simulations = self.config.simulations,
            batches = plans.len(),
            workers = self.config.workers,
            seed,
            "starting simulation run"
        );

        let start = Instant::now();
        let results: Vec<(BatchPlan, Result<BatchSummary>)> = if self.config.workers == 1 {
            plans
                .iter()
                .map(|plan| (*plan, self.run_isolated(plan, seed, sink)))
                .collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.workers)
                .build()
                .map_err(|e| SimError::WorkerPool(e.to_string()))?;
            pool.install(|| {
                plans
                    .par_iter()
                    .map(|plan| (*plan, self.run_isolated(plan, seed, sink)))
                    .collect()
            })
        };
        let elapsed = start.elapsed();

        let mut totals = BatchSummary::default();
        let mut failed_batches = Vec::new();
        for (plan, result) in results {
            match result {
                Ok(summary) => totals.merge(&summary),
                Err(e) => {
                    warn!(
                        batch = plan.index,
                        matches = plan.matches,
                        retryable = e.is_retryable(),
                        error = %e,
                        "batch excluded from totals"
                    );
                    failed_batches.push(BatchFailure {
                        batch_index: plan.index,
                        matches: plan.matches,
                        error: e.to_string(),
                    });
                }
            }
        }

        let players = self.runner.players();
        let report = SimulationReport {
            player_names: players.clone().map(|p| p.name),
            requested: self.config.simulations,
            seed,
            totals,
            failed_batches,
            duration_ms: elapsed.as_secs_f64() * 1000.0,
        };
        info!(
            completed = report.completed(),
            shortfall = report.shortfall(),
            duration_ms = report.duration_ms,
            "simulation run finished"
        );
        Ok(report)
    }

    /// Run one batch, turning a panic into a [`SimError::WorkerPanicked`].
    pub fn run_isolated(
        &self,
        plan: &BatchPlan,
        seed: u64,
        sink: Option<&dyn PointLogSink>,
    ) -> Result<BatchSummary> {
        panic::catch_unwind(AssertUnwindSafe(|| self.run_batch(plan, seed, sink))).unwrap_or_else(
            |payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(SimError::WorkerPanicked {
                    batch: plan.index,
                    message,
                })
            },
        )
    }

    /// Play every match of `plan`. Any match error fails the whole batch.
    pub fn run_batch(
        &self,
        plan: &BatchPlan,
        seed: u64,
        sink: Option<&dyn PointLogSink>,
    ) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        let collect_logs = plan.export_logs && sink.is_some();
        let mut log = BatchLog {
            batch_index: plan.index,
            first_match: plan.first_match,
            records: Vec::new(),
        };

        for match_index in plan.match_range() {
            let mut rng = match_rng(seed, match_index);
            let outcome = self.runner.run(&mut rng)?;
            summary.record(&outcome);
            if collect_logs {
                log.records.extend(outcome.point_log);
            }
        }

        if let (true, Some(sink)) = (collect_logs, sink) {
            match sink.export(&log) {
                Ok(()) => summary.logs_exported += 1,
                Err(e) => {
                    warn!(batch = plan.index, error = %e, "point log export failed");
                    summary.log_export_failures += 1;
                }
            }
        }
        debug!(
            batch = plan.index,
            matches = summary.matches,
            points = summary.total_points,
            "batch complete"
        );
        Ok(summary)
    }
}
