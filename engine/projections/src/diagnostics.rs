//! Accuracy of simulated means against site projections

use crate::pool::{PoolContext, PoolEntry};
use prior_store::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Error and calibration measures over one group of players
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    pub n: usize,
    pub mae: Option<f64>,
    pub rmse: Option<f64>,

    /// Pearson correlation; absent below two players or with zero variance
    pub correlation: Option<f64>,

    /// Share of site projections inside `[p10, p90]`
    pub coverage: Option<f64>,
    pub coverage_n: usize,
}

/// Pool-wide diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub overall: AccuracyMetrics,
    pub by_position: BTreeMap<Position, AccuracyMetrics>,
    pub total_players: usize,
    pub rookie_fallback_count: usize,
    pub evaluated_count: usize,
}

pub struct DiagnosticsEngine;

impl DiagnosticsEngine {
    /// Compare every non-fallback player with a positive site projection
    pub fn evaluate(pool: &PoolContext) -> Diagnostics {
        let evaluated: Vec<&PoolEntry> = pool.iter().filter(|e| e.is_evaluable()).collect();

        let mut grouped: BTreeMap<Position, Vec<&PoolEntry>> = BTreeMap::new();
        for entry in &evaluated {
            grouped.entry(entry.position).or_default().push(entry);
        }
        let by_position =
            grouped.iter().map(|(position, group)| (*position, accuracy(group))).collect();

        let diagnostics = Diagnostics {
            overall: accuracy(&evaluated),
            by_position,
            total_players: pool.len(),
            rookie_fallback_count: pool.iter().filter(|e| e.summary.rookie_fallback).count(),
            evaluated_count: evaluated.len(),
        };

        if diagnostics.evaluated_count == 0 {
            warn!("No players with a site projection to evaluate");
        } else {
            debug!(
                "Diagnostics over {} players: MAE {:?}, correlation {:?}",
                diagnostics.evaluated_count,
                diagnostics.overall.mae,
                diagnostics.overall.correlation
            );
        }
        diagnostics
    }
}

fn accuracy(entries: &[&PoolEntry]) -> AccuracyMetrics {
    let pairs: Vec<(f64, f64)> = entries
        .iter()
        .filter_map(|e| e.site_projection.map(|site| (e.summary.mean, site)))
        .collect();
    let n = pairs.len();

    let (mae, rmse) = if n == 0 {
        (None, None)
    } else {
        let abs: f64 = pairs.iter().map(|(sim, site)| (sim - site).abs()).sum();
        let sq: f64 = pairs.iter().map(|(sim, site)| (sim - site).powi(2)).sum();
        (Some(abs / n as f64), Some((sq / n as f64).sqrt()))
    };

    let covered: Vec<bool> = entries
        .iter()
        .filter_map(|e| {
            let site = e.site_projection?;
            let low = e.summary.floor_p10()?;
            let high = e.summary.ceiling_p90()?;
            Some(site >= low && site <= high)
        })
        .collect();
    let coverage_n = covered.len();
    let coverage = (coverage_n > 0)
        .then(|| covered.iter().filter(|c| **c).count() as f64 / coverage_n as f64);

    AccuracyMetrics { n, mae, rmse, correlation: pearson(&pairs), coverage, coverage_n }
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return None;
    }
    let r = cov / (var_x * var_y).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
