//! Slate report assembly

use crate::boom::{BoomCalculator, BoomScore};
use crate::compare::ComparisonRecord;
use crate::config::ProjectionConfig;
use crate::diagnostics::{Diagnostics, DiagnosticsEngine};
use crate::error::ProjectionError;
use crate::flags::NotableFlags;
use crate::pool::PoolContext;
use crate::value::{ValueCalculator, ValueMetrics};
use chrono::{DateTime, Utc};
use prior_store::Position;
use serde::{Deserialize, Serialize};
use sim_engine::{PlayerSummary, RecordDefect, RunOutput, RunStats};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Describes the run a report was built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: String,
    pub season: i32,
    pub week: u32,
    pub n_draws: usize,
    pub seed: u64,
    pub generated_at: DateTime<Utc>,
    pub player_count: usize,
    pub position_counts: BTreeMap<Position, usize>,
    pub team_count: usize,
    pub game_count: usize,
    pub rookie_fallback_count: usize,

    /// Hex SipHash of the run inputs
    pub inputs_hash: String,
}

/// Everything derived for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerReport {
    pub summary: PlayerSummary,
    pub value: ValueMetrics,
    pub boom: BoomScore,
    pub comparison: ComparisonRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlateReport {
    pub metadata: RunMetadata,

    /// Slate order
    pub players: Vec<PlayerReport>,

    /// Best value first; players without a salary are left out
    pub value_leaderboard: Vec<ValueMetrics>,
    pub diagnostics: Diagnostics,
    pub flags: NotableFlags,
    pub defects: Vec<RecordDefect>,
    pub stats: RunStats,
}

impl SlateReport {
    pub fn player(&self, player_id: &str) -> Option<&PlayerReport> {
        self.players.iter().find(|p| p.summary.player_id == player_id)
    }
}

/// Derive boom scores, value metrics, diagnostics and flags for a run
pub fn build_report(
    output: &RunOutput,
    config: &ProjectionConfig,
) -> Result<SlateReport, ProjectionError> {
    config.validate()?;

    let pool = PoolContext::from_run(output);
    if pool.is_empty() {
        return Err(ProjectionError::EmptyPool);
    }

    let values = ValueCalculator::calculate_pool(&pool);
    let booms = BoomCalculator::new(config.boom.clone()).score_pool(&pool, &values)?;
    let diagnostics = DiagnosticsEngine::evaluate(&pool);

    let players: Vec<PlayerReport> = pool
        .iter()
        .zip(&values)
        .zip(&booms)
        .map(|((entry, value), boom)| PlayerReport {
            summary: entry.summary.clone(),
            value: value.clone(),
            boom: boom.clone(),
            comparison: ComparisonRecord::new(entry, value, boom),
        })
        .collect();

    let comparisons: Vec<ComparisonRecord> =
        players.iter().map(|p| p.comparison.clone()).collect();
    let flags = NotableFlags::from_records(&comparisons, config.flags.top_n);
    let value_leaderboard =
        ValueCalculator::leaderboard(&values).into_iter().cloned().collect();

    let metadata = metadata(output, &pool, diagnostics.rookie_fallback_count);
    info!(
        "Built report {}: {} players, {} dart throws, {} evaluated",
        metadata.run_id,
        players.len(),
        flags.dart_throws.len(),
        diagnostics.evaluated_count
    );

    Ok(SlateReport {
        metadata,
        players,
        value_leaderboard,
        diagnostics,
        flags,
        defects: output.defects.clone(),
        stats: output.stats.clone(),
    })
}

fn metadata(output: &RunOutput, pool: &PoolContext, rookie_fallback_count: usize) -> RunMetadata {
    let mut position_counts = BTreeMap::new();
    for entry in pool.iter() {
        *position_counts.entry(entry.position).or_insert(0) += 1;
    }
    let teams: BTreeSet<&str> = pool.iter().map(|e| e.team.as_str()).collect();
    let games: BTreeSet<String> = output.players.iter().map(|p| p.player.matchup_key()).collect();

    RunMetadata {
        run_id: output.run.run_id(),
        season: output.run.season,
        week: output.run.week,
        n_draws: output.run.n_draws,
        seed: output.run.seed,
        generated_at: Utc::now(),
        player_count: pool.len(),
        position_counts,
        team_count: teams.len(),
        game_count: games.len(),
        rookie_fallback_count,
        inputs_hash: format!("{:016x}", output.inputs_hash),
    }
}
