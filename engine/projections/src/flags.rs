//! Notable players worth a second look

use crate::compare::ComparisonRecord;
use serde::{Deserialize, Serialize};

/// Player ids grouped by why they stand out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotableFlags {
    /// Simulation most above the site projection, largest first
    pub high_delta: Vec<String>,

    /// Simulation most below the site projection, most negative first
    pub low_delta: Vec<String>,

    /// Every dart throw, highest boom score first
    pub dart_throws: Vec<String>,
}

impl NotableFlags {
    pub fn from_records(records: &[ComparisonRecord], top_n: usize) -> Self {
        let mut with_delta: Vec<(&ComparisonRecord, f64)> =
            records.iter().filter_map(|r| r.delta_mean.map(|d| (r, d))).collect();

        with_delta.sort_by(|(a, da), (b, db)| {
            db.total_cmp(da).then_with(|| a.player_id.cmp(&b.player_id))
        });
        let high_delta = with_delta
            .iter()
            .filter(|(_, d)| *d > 0.0)
            .take(top_n)
            .map(|(r, _)| r.player_id.clone())
            .collect();

        with_delta.sort_by(|(a, da), (b, db)| {
            da.total_cmp(db).then_with(|| a.player_id.cmp(&b.player_id))
        });
        let low_delta = with_delta
            .iter()
            .filter(|(_, d)| *d < 0.0)
            .take(top_n)
            .map(|(r, _)| r.player_id.clone())
            .collect();

        let mut darts: Vec<&ComparisonRecord> = records.iter().filter(|r| r.dart_throw).collect();
        darts.sort_by(|a, b| {
            b.boom_score.total_cmp(&a.boom_score).then_with(|| a.player_id.cmp(&b.player_id))
        });

        Self {
            high_delta,
            low_delta,
            dart_throws: darts.into_iter().map(|r| r.player_id.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prior_store::Position;

    fn record(id: &str, delta: Option<f64>, boom_score: f64, dart_throw: bool) -> ComparisonRecord {
        ComparisonRecord {
            player_id: id.to_string(),
            name: id.to_string(),
            position: Position::WR,
            team: "KC".to_string(),
            opponent: "LV".to_string(),
            site_projection: delta.map(|_| 10.0),
            sim_mean: 10.0 + delta.unwrap_or(0.0),
            delta_mean: delta,
            pct_delta: delta.map(|d| d / 10.0),
            beat_site_probability: None,
            value_per_1k: None,
            ceil_per_1k: None,
            site_value_per_1k: None,
            boom_score,
            dart_throw,
            salary: None,
            ownership: None,
            rookie_fallback: false,
        }
    }

    #[test]
    fn test_flags() {
        let records = vec![
            record("A", Some(4.0), 50.0, false),
            record("B", Some(1.0), 80.0, true),
            record("C", Some(-3.0), 90.0, true),
            record("D", Some(-0.5), 10.0, false),
            record("E", None, 40.0, false),
            record("F", Some(0.0), 40.0, false),
        ];

        let flags = NotableFlags::from_records(&records, 1);
        assert_eq!(flags.high_delta, vec!["A"]);
        assert_eq!(flags.low_delta, vec!["C"]);
        assert_eq!(flags.dart_throws, vec!["C", "B"]);

        let flags = NotableFlags::from_records(&records, 10);
        assert_eq!(flags.high_delta, vec!["A", "B"]);
        assert_eq!(flags.low_delta, vec!["C", "D"]);
    }
}
