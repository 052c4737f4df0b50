//! # scanfuse - stability-gated occupancy mapping
//!
//! Usage:
//!   scanfuse                                 # Simulated robot, default config
//!   scanfuse --config mapping.yaml           # YAML or TOML configuration
//!   scanfuse --duration 30 --seed 7          # Bounded, reproducible run
//!   scanfuse --replay fixes.json             # Replay recorded position fixes
//!
//! Stop with Ctrl+C; the final grid is printed on shutdown.

use anyhow::{Context, Result};
use clap::Parser;
use scanfuse::library::FusionConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Parser)]
#[command(name = "scanfuse")]
#[command(version = scanfuse::VERSION)]
#[command(about = "Stability-gated occupancy mapping from position fixes and laser scans")]
pub struct Args {
    /// Configuration file (YAML or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many seconds (runs until Ctrl+C otherwise)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Scheduler loop rate in Hz
    #[arg(long)]
    tick_rate: Option<f64>,

    /// Seed for the simulated position fixes
    #[arg(long)]
    seed: Option<u64>,

    /// Replay position fixes from a JSON file instead of simulating them
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Verbose logging (debug level, including pub/sub traffic)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(args: &Args) -> Result<FusionConfig> {
    let mut config = match &args.config {
        Some(path) => FusionConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FusionConfig::default(),
    };

    if let Some(rate) = args.tick_rate {
        config.scheduler.tick_rate_hz = rate;
    }
    if let Some(seed) = args.seed {
        config.sources.simulation.seed = seed;
    }
    if let Some(path) = &args.replay {
        config.sources.fix_replay = Some(path.clone());
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_tracing(args.verbose);

    let config = load_config(&args)?;
    let duration = args
        .duration
        .map(scanfuse::runtime::run_duration)
        .transpose()
        .context("invalid --duration")?;
    info!(
        "scanfuse {}: {}x{} grid at {} per cell",
        scanfuse::version(),
        config.grid.width,
        config.grid.height,
        config.grid.resolution
    );

    let mut scheduler =
        scanfuse::runtime::build_scheduler(&config).context("failed to set up nodes")?;

    match duration {
        Some(duration) => scheduler.run_for(duration)?,
        None => scheduler.run()?,
    }

    Ok(())
}
