//! Tennis Odds CLI Library
//!
//! Glue between the simulation engine and the file system: loads the
//! engine configuration, wires the CSV point-log sink and runs the batch
//! orchestrator.

pub mod csv_sink;

use anyhow::{Context, Result};
use std::path::Path;
use tennis_core::{BatchOrchestrator, EngineConfig, PointLogSink, SimulationReport};
use tracing::info;

pub use csv_sink::CsvPointLogSink;

/// Default point-log file name.
pub const DEFAULT_LOG_PATH: &str = "match_log_parallel.csv";

/// Load an engine configuration from YAML, or fall back to the reference matchup.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_yaml(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Run a full simulation, appending exported point logs to `log_path` if given.
pub fn run_simulation(config: &EngineConfig, log_path: Option<&Path>) -> Result<SimulationReport> {
    let orchestrator = BatchOrchestrator::from_config(config).context("Invalid engine configuration")?;

    let sink = log_path
        .map(|path| CsvPointLogSink::open(path, &config.players()))
        .transpose()?;
    if let Some(sink) = &sink {
        info!(path = %sink.path().display(), "appending point logs");
    }

    let report = orchestrator
        .run(sink.as_ref().map(|s| s as &dyn PointLogSink))
        .context("Simulation run failed")?;

    if let Some(sink) = &sink {
        info!(rows = sink.rows_written(), elapsed = ?report.duration(), "point log written");
    }
    Ok(report)
}
