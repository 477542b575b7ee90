//! Loads inputs, runs the engine and writes the report

use crate::config::ServiceConfig;
use anyhow::{Context, Result};
use metrics::histogram;
use prior_store::{JsonPriorStore, PriorSnapshot};
use projections::{build_report, SlateReport};
use sim_engine::{SimulationEngine, SlatePlayer};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Read a slate file: a JSON array of slate players
pub fn load_slate(path: &Path) -> Result<Vec<SlatePlayer>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read slate: {}", path.display()))?;
    let slate: Vec<SlatePlayer> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse slate: {}", path.display()))?;
    Ok(slate)
}

/// Load the prior snapshot from a JSON store directory
pub fn load_priors(dir: &Path) -> Result<PriorSnapshot> {
    let store = JsonPriorStore::new(dir);
    let snapshot = PriorSnapshot::load(&store)
        .with_context(|| format!("Failed to load priors from {}", dir.display()))?;
    info!(
        "Loaded {} team priors and {} player priors",
        snapshot.team_count(),
        snapshot.player_count()
    );
    Ok(snapshot)
}

/// Simulate a slate and derive its report
pub fn run_slate(
    config: &ServiceConfig,
    priors: &PriorSnapshot,
    slate: &[SlatePlayer],
) -> Result<SlateReport> {
    let started = Instant::now();

    let engine =
        SimulationEngine::new(config.engine.clone()).context("Failed to create engine")?;
    let output = engine.run(priors, slate).context("Simulation run failed")?;

    if !output.defects.is_empty() {
        warn!("{} slate records had defects", output.defects.len());
    }

    let report =
        build_report(&output, &config.projections).context("Failed to build slate report")?;
    histogram!("dfs_sim_report_duration_ms", started.elapsed().as_secs_f64() * 1000.0);

    Ok(report)
}

/// Serialize a report to the configured destination, or stdout
pub fn write_report(report: &SlateReport, output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
    .context("Failed to serialize report")?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
