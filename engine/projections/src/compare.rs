//! Side-by-side simulated vs site projection records

use crate::boom::BoomScore;
use crate::pool::PoolEntry;
use crate::value::ValueMetrics;
use prior_store::Position;
use serde::{Deserialize, Serialize};

/// One player's simulated projection next to the site's
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub player_id: String,
    pub name: String,
    pub position: Position,
    pub team: String,
    pub opponent: String,
    pub site_projection: Option<f64>,
    pub sim_mean: f64,

    /// `sim_mean - site_projection`
    pub delta_mean: Option<f64>,

    /// `delta_mean / max(site_projection, 1)`
    pub pct_delta: Option<f64>,
    pub beat_site_probability: Option<f64>,
    pub value_per_1k: Option<f64>,
    pub ceil_per_1k: Option<f64>,
    pub site_value_per_1k: Option<f64>,
    pub boom_score: f64,
    pub dart_throw: bool,
    pub salary: Option<u32>,
    pub ownership: Option<f64>,
    pub rookie_fallback: bool,
}

impl ComparisonRecord {
    pub fn new(entry: &PoolEntry, value: &ValueMetrics, boom: &BoomScore) -> Self {
        let sim_mean = entry.summary.mean;
        let delta_mean = entry.site_projection.map(|site| sim_mean - site);
        let pct_delta = entry
            .site_projection
            .zip(delta_mean)
            .map(|(site, delta)| delta / site.max(1.0));

        Self {
            player_id: entry.player_id.clone(),
            name: entry.name.clone(),
            position: entry.position,
            team: entry.team.clone(),
            opponent: entry.opponent.clone(),
            site_projection: entry.site_projection,
            sim_mean,
            delta_mean,
            pct_delta,
            beat_site_probability: entry.summary.beat_site_probability,
            value_per_1k: value.value_per_1k,
            ceil_per_1k: value.ceil_per_1k,
            site_value_per_1k: value.site_value_per_1k,
            boom_score: boom.boom_score,
            dart_throw: boom.dart_throw,
            salary: entry.salary,
            ownership: entry.ownership,
            rookie_fallback: entry.summary.rookie_fallback,
        }
    }
}
