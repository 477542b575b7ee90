//! Distribution summaries of simulated outcomes

use crate::error::SimError;
use prior_store::Position;
use serde::{Deserialize, Serialize};

/// Outcome percentiles (linear interpolation between order statistics)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

impl Percentiles {
    fn from_sorted(sorted: &[f64]) -> Self {
        Self {
            p10: percentile(sorted, 0.10),
            p25: percentile(sorted, 0.25),
            p50: percentile(sorted, 0.50),
            p75: percentile(sorted, 0.75),
            p90: percentile(sorted, 0.90),
            p95: percentile(sorted, 0.95),
        }
    }
}

/// Reduced view of one player's outcome vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player_id: String,
    pub position: Position,
    pub mean: f64,

    /// Population standard deviation
    pub std: f64,

    /// Absent below the stability floor. `mean` need not lie within
    /// `[p10, p90]`: a mostly-zero outcome with rare big games has
    /// `p90 == 0 < mean`.
    pub percentiles: Option<Percentiles>,

    /// Threshold used for `boom_probability`
    pub boom_threshold: f64,
    pub boom_probability: f64,

    /// Absent without a site projection
    pub beat_site_probability: Option<f64>,

    pub rookie_fallback: bool,
    pub below_stability_floor: bool,
    pub n_draws: usize,
}

impl PlayerSummary {
    pub fn floor_p10(&self) -> Option<f64> {
        self.percentiles.map(|p| p.p10)
    }

    pub fn ceiling_p90(&self) -> Option<f64> {
        self.percentiles.map(|p| p.p90)
    }
}

/// Inputs that shape a summary besides the outcomes themselves
#[derive(Debug, Clone, Copy)]
pub struct SummaryOptions {
    /// Position boom threshold; the player's own p90 when absent
    pub boom_threshold: Option<f64>,
    pub site_projection: Option<f64>,
    pub rookie_fallback: bool,
    pub min_stable_draws: usize,
}

/// Value at fraction `p` of an ascending slice, with `rank = p * (n - 1)`
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = (lower + 1).min(n - 1);
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Summarize an outcome vector. Summarizing the same vector twice gives the
/// same summary.
pub fn summarize(
    player_id: &str,
    position: Position,
    outcomes: &[f64],
    options: SummaryOptions,
) -> Result<PlayerSummary, SimError> {
    if outcomes.is_empty() {
        return Err(SimError::EmptyOutcomes { player_id: player_id.to_string() });
    }

    let n = outcomes.len();
    let mean = outcomes.iter().sum::<f64>() / n as f64;
    let variance = outcomes.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;

    let mut sorted = outcomes.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let boom_threshold = options.boom_threshold.unwrap_or_else(|| percentile(&sorted, 0.90));
    let share_at_least = |threshold: f64| {
        let below = sorted.partition_point(|x| *x < threshold);
        (n - below) as f64 / n as f64
    };

    let below_stability_floor = n < options.min_stable_draws;
    let percentiles = (!below_stability_floor).then(|| Percentiles::from_sorted(&sorted));

    Ok(PlayerSummary {
        player_id: player_id.to_string(),
        position,
        mean,
        std: variance.sqrt(),
        percentiles,
        boom_threshold,
        boom_probability: share_at_least(boom_threshold),
        beat_site_probability: options.site_projection.map(share_at_least),
        rookie_fallback: options.rookie_fallback,
        below_stability_floor,
        n_draws: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn options(threshold: Option<f64>, site: Option<f64>) -> SummaryOptions {
        SummaryOptions {
            boom_threshold: threshold,
            site_projection: site,
            rookie_fallback: false,
            min_stable_draws: 1,
        }
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [10.0, 12.0, 14.0, 16.0];
        assert_eq!(percentile(&sorted, 0.0), 10.0);
        assert_eq!(percentile(&sorted, 1.0), 16.0);
        // rank 0.3 -> 10 + 0.3 * 2
        assert!((percentile(&sorted, 0.10) - 10.6).abs() < 1e-12);
        assert!((percentile(&sorted, 0.90) - 15.4).abs() < 1e-12);
        assert_eq!(percentile(&[7.0], 0.9), 7.0);
    }

    #[test]
    fn test_summary_values() {
        let outcomes: Vec<f64> = (0..=100).map(f64::from).collect();
        let summary = summarize("X", Position::WR, &outcomes, options(Some(18.0), Some(50.0))).unwrap();

        assert_eq!(summary.mean, 50.0);
        assert_eq!(summary.floor_p10(), Some(10.0));
        assert_eq!(summary.ceiling_p90(), Some(90.0));
        assert!((summary.boom_probability - 83.0 / 101.0).abs() < 1e-12);
        assert!((summary.beat_site_probability.unwrap() - 51.0 / 101.0).abs() < 1e-12);
        assert!(!summary.below_stability_floor);
    }

    #[test]
    fn test_missing_threshold_uses_own_p90() {
        let outcomes: Vec<f64> = (0..=100).map(f64::from).collect();
        let summary = summarize("X", Position::TE, &outcomes, options(None, None)).unwrap();
        assert_eq!(summary.boom_threshold, 90.0);
        assert!((summary.boom_probability - 11.0 / 101.0).abs() < 1e-12);
        assert_eq!(summary.beat_site_probability, None);
    }

    #[test]
    fn test_stability_floor() {
        let outcomes = vec![5.0; 999];
        let opts = SummaryOptions { min_stable_draws: 1000, ..options(Some(10.0), None) };
        let summary = summarize("X", Position::RB, &outcomes, opts).unwrap();
        assert!(summary.below_stability_floor);
        assert_eq!(summary.percentiles, None);
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.std, 0.0);
    }

    #[test]
    fn test_single_draw_and_empty() {
        let summary = summarize("X", Position::QB, &[21.5], options(Some(25.0), Some(20.0))).unwrap();
        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.ceiling_p90(), Some(21.5));
        assert_eq!(summary.boom_probability, 0.0);
        assert_eq!(summary.beat_site_probability, Some(1.0));

        assert!(matches!(
            summarize("X", Position::QB, &[], options(None, None)),
            Err(SimError::EmptyOutcomes { .. })
        ));
    }

    #[test]
    fn test_mean_can_exceed_p90_when_zero_inflated() {
        let mut outcomes = vec![0.0; 95];
        outcomes.extend([20.0; 5]);
        let summary = summarize("X", Position::TE, &outcomes, options(None, None)).unwrap();
        assert_eq!(summary.ceiling_p90(), Some(0.0));
        assert_eq!(summary.mean, 1.0);
    }

    proptest! {
        #[test]
        fn prop_mean_within_p10_p90_for_symmetric_outcomes(
            center in 5.0f64..40.0,
            offsets in prop::collection::vec(0.0f64..5.0, 1..200),
        ) {
            let outcomes: Vec<f64> =
                offsets.iter().flat_map(|d| [center - d, center + d]).collect();
            let summary = summarize("P", Position::WR, &outcomes, options(None, None)).unwrap();
            let p = summary.percentiles.unwrap();
            prop_assert!(p.p10 <= summary.mean + 1e-9);
            prop_assert!(summary.mean <= p.p90 + 1e-9);
        }

        #[test]
        fn prop_mean_within_range(outcomes in prop::collection::vec(0.0f64..60.0, 1..400)) {
            let summary = summarize("P", Position::WR, &outcomes, options(None, None)).unwrap();
            let min = outcomes.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = outcomes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(min - 1e-9 <= summary.mean && summary.mean <= max + 1e-9);
        }

        #[test]
        fn prop_percentiles_monotone(outcomes in prop::collection::vec(0.0f64..60.0, 1..400)) {
            let summary = summarize("P", Position::WR, &outcomes, options(Some(18.0), Some(12.0))).unwrap();
            let p = summary.percentiles.unwrap();
            prop_assert!(p.p10 <= p.p25);
            prop_assert!(p.p25 <= p.p50);
            prop_assert!(p.p50 <= p.p75);
            prop_assert!(p.p75 <= p.p90);
            prop_assert!(p.p90 <= p.p95);
        }

        #[test]
        fn prop_probabilities_bounded(
            outcomes in prop::collection::vec(0.0f64..60.0, 1..400),
            threshold in 0.0f64..60.0,
            site in 0.0f64..60.0,
        ) {
            let summary = summarize("P", Position::RB, &outcomes, options(Some(threshold), Some(site))).unwrap();
            prop_assert!((0.0..=1.0).contains(&summary.boom_probability));
            let beat = summary.beat_site_probability.unwrap();
            prop_assert!((0.0..=1.0).contains(&beat));
            prop_assert!(summary.std >= 0.0);
        }

        #[test]
        fn prop_summary_idempotent(outcomes in prop::collection::vec(0.0f64..60.0, 1..200)) {
            let a = summarize("P", Position::TE, &outcomes, options(None, Some(9.0))).unwrap();
            let b = summarize("P", Position::TE, &outcomes, options(None, Some(9.0))).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
