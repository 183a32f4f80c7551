//! Aggregated results.
//!
//! [`BatchSummary`] values are merged by plain addition, so the final
//! [`SimulationReport`] does not depend on the order in which batches
//! finish.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::engine::MatchOutcome;
use crate::player::{PerSide, Side};

/// Counters of one batch, or of any number of merged batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub matches: u64,
    pub wins: PerSide<u64>,
    pub total_points: u64,
    pub aces: PerSide<u64>,
    pub double_faults: PerSide<u64>,
    pub logs_exported: u64,
    pub log_export_failures: u64,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &MatchOutcome) {
        self.matches += 1;
        self.wins[outcome.winner] += 1;
        self.total_points += outcome.total_points;
        self.aces += outcome.aces.map(u64::from);
        self.double_faults += outcome.double_faults.map(u64::from);
    }

    pub fn merge(&mut self, other: &BatchSummary) {
        self.matches += other.matches;
        self.wins += other.wins;
        self.total_points += other.total_points;
        self.aces += other.aces;
        self.double_faults += other.double_faults;
        self.logs_exported += other.logs_exported;
        self.log_export_failures += other.log_export_failures;
    }
}

/// A batch excluded from the totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub batch_index: usize,
    /// Matches the batch was supposed to play; none of them are counted.
    pub matches: u64,
    pub error: String,
}

/// Final result of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub player_names: PerSide<String>,
    pub requested: u64,
    pub seed: u64,
    pub totals: BatchSummary,
    pub failed_batches: Vec<BatchFailure>,
    pub duration_ms: f64,
}

impl SimulationReport {
    pub fn completed(&self) -> u64 {
        self.totals.matches
    }

    /// Matches requested but not counted because their batch failed.
    pub fn shortfall(&self) -> u64 {
        self.requested.saturating_sub(self.totals.matches)
    }

    pub fn is_complete(&self) -> bool {
        self.failed_batches.is_empty() && self.shortfall() == 0
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_ms / 1000.0)
    }

    pub fn wins(&self, side: Side) -> u64 {
        self.totals.wins[side]
    }

    fn per_match(&self, value: u64) -> f64 {
        if self.totals.matches == 0 {
            0.0
        } else {
            value as f64 / self.totals.matches as f64
        }
    }

    /// Share of completed matches won by `side`.
    pub fn win_fraction(&self, side: Side) -> f64 {
        self.per_match(self.totals.wins[side])
    }

    pub fn aces_per_match(&self, side: Side) -> f64 {
        self.per_match(self.totals.aces[side])
    }

    pub fn double_faults_per_match(&self, side: Side) -> f64 {
        self.per_match(self.totals.double_faults[side])
    }

    pub fn points_per_match(&self) -> f64 {
        self.per_match(self.totals.total_points)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Perc of Match wins after {} matches:", self.completed())?;
        for (side, name) in self.player_names.iter() {
            writeln!(f, "{}: {:.4}", name, self.win_fraction(side))?;
        }
        writeln!(f)?;
        writeln!(f, "Total shots played: {}", self.totals.total_points)?;
        writeln!(f, "Execution time: {:.2} milliseconds", self.duration_ms)?;
        writeln!(f)?;
        writeln!(f, "Match statistics:")?;
        for (side, name) in self.player_names.iter() {
            writeln!(f, "{}:", name)?;
            writeln!(f, " Perc. Aces: {:.4}", self.aces_per_match(side))?;
            writeln!(f, " Perc. Double faults: {:.4}", self.double_faults_per_match(side))?;
        }
        if !self.failed_batches.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "{} batches failed, {} matches not counted",
                self.failed_batches.len(),
                self.shortfall()
            )?;
        }
        Ok(())
    }
}
