//! Tennis Odds CLI
//!
//! Runs a Monte Carlo batch of matches and prints the win / serve summary.
//! Point logs of every `--log-interval`-th match range are appended to a CSV.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tennis_core::{EngineConfig, Player};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tennis-odds", version)]
#[command(about = "Simulate tennis matches point by point and report win odds", long_about = None)]
struct Cli {
    /// YAML engine configuration; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Player 1 name
    #[arg(long)]
    p1_name: Option<String>,
    /// Player 1 probability of winning a point on serve
    #[arg(long)]
    p1_serve: Option<f64>,
    /// Player 1 base ace probability
    #[arg(long)]
    p1_ace: Option<f64>,
    /// Player 1 double-fault probability
    #[arg(long)]
    p1_double_fault: Option<f64>,

    /// Player 2 name
    #[arg(long)]
    p2_name: Option<String>,
    #[arg(long)]
    p2_serve: Option<f64>,
    #[arg(long)]
    p2_ace: Option<f64>,
    #[arg(long)]
    p2_double_fault: Option<f64>,

    /// Number of sets in the match (odd)
    #[arg(long)]
    best_of: Option<u32>,

    /// Play the deciding-set breaker to 10 points
    #[arg(long)]
    grand_slam: Option<bool>,

    #[arg(long)]
    simulations: Option<u64>,

    /// Worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Matches per batch
    #[arg(long)]
    batch_size: Option<u64>,

    /// Export the point log of the batch crossing every N-th match
    #[arg(long)]
    log_interval: Option<u64>,

    /// Base seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Per-match safety cap on points
    #[arg(long)]
    max_points: Option<u64>,

    /// Point log CSV (appended)
    #[arg(long, default_value = tennis_cli::DEFAULT_LOG_PATH)]
    output: PathBuf,

    /// Do not write point logs
    #[arg(long, default_value = "false")]
    no_log: bool,

    /// Print the report as JSON instead of text
    #[arg(long, default_value = "false")]
    json: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long, default_value = "false")]
    print_config: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut EngineConfig) {
        override_player(
            &mut config.player1,
            &self.p1_name,
            self.p1_serve,
            self.p1_ace,
            self.p1_double_fault,
        );
        override_player(
            &mut config.player2,
            &self.p2_name,
            self.p2_serve,
            self.p2_ace,
            self.p2_double_fault,
        );

        if let Some(best_of) = self.best_of {
            config.match_config.best_of = best_of;
        }
        if let Some(grand_slam) = self.grand_slam {
            config.match_config.grand_slam_final_set_tiebreak = grand_slam;
        }

        let sim = &mut config.simulation;
        if let Some(v) = self.simulations {
            sim.simulations = v;
        }
        if let Some(v) = self.workers {
            sim.workers = v;
        }
        if let Some(v) = self.batch_size {
            sim.batch_size = v;
        }
        if let Some(v) = self.log_interval {
            sim.log_interval = v;
        }
        if let Some(v) = self.max_points {
            sim.max_points_per_match = v;
        }
        if self.seed.is_some() {
            sim.seed = self.seed;
        }
    }
}

fn override_player(
    player: &mut Player,
    name: &Option<String>,
    serve: Option<f64>,
    ace: Option<f64>,
    double_fault: Option<f64>,
) {
    if let Some(name) = name {
        player.name = name.clone();
    }
    if let Some(v) = serve {
        player.serve_win_prob = v;
    }
    if let Some(v) = ace {
        player.ace_prob = v;
    }
    if let Some(v) = double_fault {
        player.double_fault_prob = v;
    }
}

fn init_tracing() {
    // Logs go to stderr so `--json` output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = tennis_cli::load_config(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid engine configuration")?;

    if cli.print_config {
        print!("{}", config.to_yaml_string()?);
        return Ok(());
    }

    let log_path = (!cli.no_log).then_some(cli.output.as_path());
    let report = tennis_cli::run_simulation(&config, log_path)?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print!("{}", report);
    }

    if !report.is_complete() {
        tracing::warn!(
            failed_batches = report.failed_batches.len(),
            shortfall = report.shortfall(),
            "some batches failed; results cover completed matches only"
        );
    }
    Ok(())
}
