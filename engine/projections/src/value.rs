//! Points-per-dollar value metrics

use crate::pool::{PoolContext, PoolEntry};
use serde::{Deserialize, Serialize};

/// Salary-normalized production for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueMetrics {
    pub player_id: String,

    /// Simulated mean per $1k of salary
    pub value_per_1k: Option<f64>,

    /// Simulated p90 per $1k of salary
    pub ceil_per_1k: Option<f64>,

    /// Site projection per $1k of salary
    pub site_value_per_1k: Option<f64>,

    /// `value_per_1k / site_value_per_1k`
    pub value_vs_site: Option<f64>,
}

/// Value calculator
pub struct ValueCalculator;

impl ValueCalculator {
    /// Metrics for one player; everything is absent without a positive salary
    pub fn calculate(entry: &PoolEntry) -> ValueMetrics {
        let thousands = entry.salary.filter(|s| *s > 0).map(|s| s as f64 / 1000.0);
        let per_1k = |points: Option<f64>| thousands.zip(points).map(|(k, p)| p / k);

        let value_per_1k = per_1k(Some(entry.summary.mean));
        let ceil_per_1k = per_1k(entry.summary.ceiling_p90());
        let site_value_per_1k = per_1k(entry.site_projection);
        let value_vs_site = match (value_per_1k, site_value_per_1k) {
            (Some(value), Some(site)) if site > 0.0 => Some(value / site),
            _ => None,
        };

        ValueMetrics {
            player_id: entry.player_id.clone(),
            value_per_1k,
            ceil_per_1k,
            site_value_per_1k,
            value_vs_site,
        }
    }

    /// Metrics for every player, in pool order
    pub fn calculate_pool(pool: &PoolContext) -> Vec<ValueMetrics> {
        pool.iter().map(Self::calculate).collect()
    }

    /// Players with a value, best first
    pub fn leaderboard(metrics: &[ValueMetrics]) -> Vec<&ValueMetrics> {
        let mut ranked: Vec<&ValueMetrics> =
            metrics.iter().filter(|m| m.value_per_1k.is_some()).collect();
        ranked.sort_by(|a, b| {
            let (va, vb) = (a.value_per_1k.unwrap_or(0.0), b.value_per_1k.unwrap_or(0.0));
            vb.total_cmp(&va).then_with(|| a.player_id.cmp(&b.player_id))
        });
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::fixtures::entry;
    use prior_store::Position;

    #[test]
    fn test_value_metrics() {
        let mut e = entry("A", Position::RB, 20.0);
        e.salary = Some(8000);
        e.site_projection = Some(16.0);

        let v = ValueCalculator::calculate(&e);
        assert_eq!(v.value_per_1k, Some(2.5));
        assert_eq!(v.ceil_per_1k, Some(26.0 / 8.0));
        assert_eq!(v.site_value_per_1k, Some(2.0));
        assert_eq!(v.value_vs_site, Some(1.25));
    }

    #[test]
    fn test_zero_or_missing_salary() {
        let mut e = entry("A", Position::WR, 14.0);
        e.salary = Some(0);
        let v = ValueCalculator::calculate(&e);
        assert_eq!(v.value_per_1k, None);
        assert_eq!(v.ceil_per_1k, None);
        assert_eq!(v.value_vs_site, None);

        e.salary = None;
        assert_eq!(ValueCalculator::calculate(&e).value_per_1k, None);
    }

    #[test]
    fn test_missing_percentiles_and_site() {
        let mut e = entry("A", Position::TE, 9.0);
        e.summary.percentiles = None;
        e.site_projection = Some(0.0);
        let v = ValueCalculator::calculate(&e);
        assert!(v.value_per_1k.is_some());
        assert_eq!(v.ceil_per_1k, None);
        assert_eq!(v.site_value_per_1k, Some(0.0));
        assert_eq!(v.value_vs_site, None);
    }

    #[test]
    fn test_leaderboard_order() {
        let mut low = entry("LOW", Position::WR, 10.0);
        low.salary = Some(5000);
        let mut high = entry("HIGH", Position::WR, 15.0);
        high.salary = Some(5000);
        let mut unpriced = entry("NONE", Position::WR, 30.0);
        unpriced.salary = None;

        let pool = PoolContext::new(vec![low, high, unpriced]);
        let metrics = ValueCalculator::calculate_pool(&pool);
        let board: Vec<&str> =
            ValueCalculator::leaderboard(&metrics).iter().map(|m| m.player_id.as_str()).collect();
        assert_eq!(board, vec!["HIGH", "LOW"]);
    }
}
