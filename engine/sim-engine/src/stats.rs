//! Per-run statistics, logged and published through the `metrics` facade

use metrics::{counter, gauge, histogram};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Statistics collected during one simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Games simulated
    pub matchups: u32,

    /// Players with an outcome vector
    pub players: u32,

    /// Players simulated from their site projection
    pub fallbacks: u32,

    /// Slate records reported as defects
    pub defects: u32,

    pub n_draws: usize,
    pub threads: usize,

    /// Time spent validating the slate and building game contexts
    pub prepare_ms: u64,

    /// Time spent in environment, usage and outcome simulation
    pub simulate_ms: u64,

    /// Time spent summarizing outcome vectors
    pub summarize_ms: u64,

    pub total_ms: u64,

    /// Player draws per second of simulation time
    pub draws_per_sec: f64,
}

impl RunStats {
    /// Fill in simulation throughput from the stage timings
    pub fn finish(&mut self, simulate: Duration, total: Duration) {
        self.simulate_ms = simulate.as_millis() as u64;
        self.total_ms = total.as_millis() as u64;

        let secs = simulate.as_secs_f64();
        self.draws_per_sec = if secs > 0.0 {
            (self.players as f64 * self.n_draws as f64) / secs
        } else {
            0.0
        };
    }

    /// Log the run and publish it through the metrics facade
    pub fn emit(&self) {
        info!(
            "Simulation run: {} matchups, {} players ({} fallback), {} defects, {} draws on {} threads in {}ms ({:.0} draws/s)",
            self.matchups,
            self.players,
            self.fallbacks,
            self.defects,
            self.n_draws,
            self.threads,
            self.total_ms,
            self.draws_per_sec
        );

        counter!("dfs_sim_runs_total", 1);
        counter!("dfs_sim_players_total", self.players as u64);
        counter!("dfs_sim_fallbacks_total", self.fallbacks as u64);
        counter!("dfs_sim_defects_total", self.defects as u64);
        histogram!("dfs_sim_run_duration_ms", self.total_ms as f64);
        histogram!("dfs_sim_simulate_duration_ms", self.simulate_ms as f64);
        gauge!("dfs_sim_draws_per_second", self.draws_per_sec);
    }
}
