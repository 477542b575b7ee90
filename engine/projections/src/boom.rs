//! Pool-relative boom scores

use crate::config::BoomConfig;
use crate::error::ProjectionError;
use crate::pool::{PoolContext, PoolEntry};
use crate::value::ValueMetrics;
use prior_store::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Boom score for one player and the parts it was built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoomScore {
    pub player_id: String,
    pub composite: f64,
    pub percentile_rank: f64,
    pub ownership_boost: f64,
    pub value_boost: f64,

    /// 0..=100
    pub boom_score: f64,
    pub dart_throw: bool,
}

/// Boom score calculator
pub struct BoomCalculator {
    config: BoomConfig,
}

impl BoomCalculator {
    pub fn new(config: BoomConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BoomConfig {
        &self.config
    }

    /// Weighted boom and beat-site probability, or boom alone without a site projection
    pub fn composite(&self, entry: &PoolEntry) -> f64 {
        let boom = entry.summary.boom_probability;
        match entry.summary.beat_site_probability {
            Some(beat_site) => {
                let total = self.config.boom_weight + self.config.beat_site_weight;
                (self.config.boom_weight * boom + self.config.beat_site_weight * beat_site) / total
            }
            None => boom,
        }
    }

    pub fn ownership_boost(&self, ownership: Option<f64>) -> f64 {
        let Some(ownership) = ownership else {
            return 0.0;
        };
        self.config
            .ownership_tiers
            .iter()
            .find(|tier| ownership <= tier.max_ownership)
            .map_or(0.0, |tier| tier.boost)
    }

    /// Linear from 0 at the position median to the maximum at the ceiling multiple
    pub fn value_boost(&self, value_per_1k: Option<f64>, position_median: Option<f64>) -> f64 {
        let (Some(value), Some(median)) = (value_per_1k, position_median) else {
            return 0.0;
        };
        if median <= 0.0 || value <= median {
            return 0.0;
        }
        let span = (self.config.value_ceiling_multiple - 1.0) * median;
        self.config.max_value_boost * ((value - median) / span).min(1.0)
    }

    pub fn is_dart_throw(&self, ownership: Option<f64>, boom_score: f64) -> bool {
        ownership.map_or(false, |own| own <= self.config.dart_max_ownership)
            && boom_score >= self.config.dart_min_score
    }

    /// Score every player in the pool; `values` must be in pool order
    pub fn score_pool(
        &self,
        pool: &PoolContext,
        values: &[ValueMetrics],
    ) -> Result<Vec<BoomScore>, ProjectionError> {
        if pool.len() != values.len() {
            let player_id = pool
                .iter()
                .nth(values.len())
                .or_else(|| pool.iter().last())
                .map(|e| e.player_id.clone())
                .unwrap_or_default();
            return Err(ProjectionError::Misaligned { player_id });
        }
        if let Some(entry) =
            pool.iter().zip(values).find(|(e, v)| e.player_id != v.player_id).map(|(e, _)| e)
        {
            return Err(ProjectionError::Misaligned { player_id: entry.player_id.clone() });
        }

        let composites: Vec<f64> = pool.iter().map(|e| self.composite(e)).collect();
        let medians = position_medians(pool, values);

        let scores: Vec<BoomScore> = pool
            .iter()
            .zip(values)
            .zip(&composites)
            .map(|((entry, value), &composite)| {
                let percentile_rank = mid_rank(&composites, composite);
                let ownership_boost = self.ownership_boost(entry.ownership);
                let value_boost =
                    self.value_boost(value.value_per_1k, medians.get(&entry.position).copied());
                let boom_score = (100.0 * percentile_rank * (1.0 + ownership_boost)
                    * (1.0 + value_boost))
                    .clamp(0.0, 100.0);

                BoomScore {
                    player_id: entry.player_id.clone(),
                    composite,
                    percentile_rank,
                    ownership_boost,
                    value_boost,
                    boom_score,
                    dart_throw: self.is_dart_throw(entry.ownership, boom_score),
                }
            })
            .collect();

        debug!(
            "Scored {} players, {} dart throws",
            scores.len(),
            scores.iter().filter(|s| s.dart_throw).count()
        );
        Ok(scores)
    }
}

impl Default for BoomCalculator {
    fn default() -> Self {
        Self::new(BoomConfig::default())
    }
}

/// `(below + 0.5 * equal) / n`
pub fn mid_rank(population: &[f64], value: f64) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let below = population.iter().filter(|&&x| x < value).count() as f64;
    let equal = population.iter().filter(|&&x| x == value).count() as f64;
    ((below + 0.5 * equal) / population.len() as f64).clamp(0.0, 1.0)
}

/// Median value-per-$1k per position, over players that have one
fn position_medians(pool: &PoolContext, values: &[ValueMetrics]) -> HashMap<Position, f64> {
    let mut by_position: HashMap<Position, Vec<f64>> = HashMap::new();
    for (entry, value) in pool.iter().zip(values) {
        if let Some(v) = value.value_per_1k {
            by_position.entry(entry.position).or_default().push(v);
        }
    }

    by_position
        .into_iter()
        .map(|(position, mut vs)| {
            vs.sort_by(|a, b| a.total_cmp(b));
            let mid = vs.len() / 2;
            let median = if vs.len() % 2 == 0 { 0.5 * (vs[mid - 1] + vs[mid]) } else { vs[mid] };
            (position, median)
        })
        .collect()
}
