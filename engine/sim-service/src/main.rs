//! DFS Sim command-line runner
//!
//! Simulates one slate and writes the JSON report to stdout or a file.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use sim_service::{
    initialize_logging, load_config, load_priors, load_slate, run_slate, save_config,
    validate_config, write_report,
};

#[derive(Parser)]
#[command(name = "dfs-sim")]
#[command(about = "Monte Carlo DFS slate simulator - outcome distributions, boom scores and value")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prior store directory
    #[arg(long)]
    priors: Option<PathBuf>,

    /// Slate JSON file
    #[arg(long)]
    slate: Option<PathBuf>,

    /// Report destination (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    season: Option<i32>,

    #[arg(long)]
    week: Option<u32>,

    /// Run seed
    #[arg(long)]
    seed: Option<u64>,

    /// Draws per player
    #[arg(short = 'n', long)]
    draws: Option<usize>,

    /// Worker threads
    #[arg(short, long)]
    threads: Option<usize>,

    /// Include raw outcome vectors in the engine output
    #[arg(long)]
    retain_outcomes: bool,

    #[arg(long)]
    log_level: Option<String>,

    /// json, pretty or compact
    #[arg(long)]
    log_format: Option<String>,

    /// Single-line JSON output
    #[arg(long)]
    compact_output: bool,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    // CLI flags take precedence over file and environment
    if let Some(priors) = cli.priors {
        config.service.priors_dir = priors;
    }
    if let Some(slate) = cli.slate {
        config.service.slate_path = slate;
    }
    if cli.output.is_some() {
        config.service.output_path = cli.output;
    }
    if cli.compact_output {
        config.service.pretty = false;
    }
    if let Some(season) = cli.season {
        config.engine.run.season = season;
    }
    if let Some(week) = cli.week {
        config.engine.run.week = week;
    }
    if let Some(seed) = cli.seed {
        config.engine.run.seed = seed;
    }
    if let Some(draws) = cli.draws {
        config.engine.run.n_draws = draws;
    }
    if cli.threads.is_some() {
        config.engine.run.threads = cli.threads;
    }
    if cli.retain_outcomes {
        config.engine.run.retain_outcomes = true;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    validate_config(&config)?;

    if let Some(path) = cli.dump_config {
        save_config(&config, &path)?;
        return Ok(());
    }

    initialize_logging(&config.logging.level, &config.logging.format)?;
    info!("Starting DFS Sim v{}", env!("CARGO_PKG_VERSION"));

    let priors = load_priors(&config.service.priors_dir)?;
    let slate = load_slate(&config.service.slate_path)?;
    info!("Loaded slate with {} records", slate.len());

    let report = run_slate(&config, &priors, &slate)?;
    info!(
        "Run {} complete: {} players, {} defects in {} ms",
        report.metadata.run_id,
        report.players.len(),
        report.defects.len(),
        report.stats.total_ms
    );

    write_report(&report, config.service.output_path.as_deref(), config.service.pretty)?;

    Ok(())
}
