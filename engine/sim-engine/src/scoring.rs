//! DraftKings classic scoring

use serde::{Deserialize, Serialize};

/// Box score for one player in one simulated game
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatLine {
    pub pass_yards: f64,
    pub pass_tds: u32,
    pub interceptions: u32,
    pub rush_yards: f64,
    pub rush_tds: u32,
    pub receptions: u32,
    pub rec_yards: f64,
    pub rec_tds: u32,

    // Defense/special teams
    pub sacks: u32,
    pub takeaways: u32,
    pub def_tds: u32,
    pub points_allowed: Option<f64>,
}

/// Points-allowed tier: any game allowing at most `max_allowed` earns `points`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointsAllowedTier {
    pub max_allowed: f64,
    pub points: f64,
}

/// Fantasy point values per stat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub pass_yard: f64,
    pub pass_td: f64,
    pub interception: f64,
    pub rush_yard: f64,
    pub rush_td: f64,
    pub reception: f64,
    pub rec_yard: f64,
    pub rec_td: f64,

    /// Bonus at `pass_bonus_yards` passing yards
    pub pass_bonus: f64,
    pub pass_bonus_yards: f64,

    /// Bonus at `yardage_bonus_yards` rushing or receiving yards (each)
    pub yardage_bonus: f64,
    pub yardage_bonus_yards: f64,

    pub sack: f64,
    pub takeaway: f64,
    pub def_td: f64,

    /// Points for allowing more than the last tier
    pub points_allowed_floor: f64,

    /// Clamp simulated outcomes at zero
    pub floor_at_zero: bool,

    /// Ascending tiers; anything above the last tier scores `points_allowed_floor`
    pub points_allowed_tiers: Vec<PointsAllowedTier>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        let tier = |max_allowed, points| PointsAllowedTier { max_allowed, points };
        Self {
            pass_yard: 0.04,
            pass_td: 4.0,
            interception: -1.0,
            rush_yard: 0.1,
            rush_td: 6.0,
            reception: 1.0,
            rec_yard: 0.1,
            rec_td: 6.0,
            pass_bonus: 3.0,
            pass_bonus_yards: 300.0,
            yardage_bonus: 3.0,
            yardage_bonus_yards: 100.0,
            sack: 1.0,
            takeaway: 2.0,
            def_td: 6.0,
            points_allowed_floor: -4.0,
            floor_at_zero: true,
            points_allowed_tiers: vec![
                tier(0.0, 10.0),
                tier(6.0, 7.0),
                tier(13.0, 4.0),
                tier(20.0, 1.0),
                tier(27.0, 0.0),
                tier(34.0, -1.0),
            ],
        }
    }
}

impl ScoringRules {
    /// Fantasy points for a stat line
    pub fn score(&self, line: &StatLine) -> f64 {
        let mut points = line.pass_yards * self.pass_yard
            + line.pass_tds as f64 * self.pass_td
            + line.interceptions as f64 * self.interception
            + line.rush_yards * self.rush_yard
            + line.rush_tds as f64 * self.rush_td
            + line.receptions as f64 * self.reception
            + line.rec_yards * self.rec_yard
            + line.rec_tds as f64 * self.rec_td
            + line.sacks as f64 * self.sack
            + line.takeaways as f64 * self.takeaway
            + line.def_tds as f64 * self.def_td;

        if line.pass_yards >= self.pass_bonus_yards {
            points += self.pass_bonus;
        }
        if line.rush_yards >= self.yardage_bonus_yards {
            points += self.yardage_bonus;
        }
        if line.rec_yards >= self.yardage_bonus_yards {
            points += self.yardage_bonus;
        }
        if let Some(allowed) = line.points_allowed {
            points += self.points_allowed_score(allowed);
        }

        if self.floor_at_zero {
            points.max(0.0)
        } else {
            points
        }
    }

    /// Tier points for a (rounded) points-allowed total
    pub fn points_allowed_score(&self, allowed: f64) -> f64 {
        let allowed = allowed.max(0.0).round();
        self.points_allowed_tiers
            .iter()
            .find(|tier| allowed <= tier.max_allowed)
            .map(|tier| tier.points)
            .unwrap_or(self.points_allowed_floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarterback_line() {
        let rules = ScoringRules::default();
        let line = StatLine {
            pass_yards: 310.0,
            pass_tds: 3,
            interceptions: 1,
            rush_yards: 20.0,
            ..Default::default()
        };
        // 12.4 + 12 - 1 + 2 + 3 bonus
        assert!((rules.score(&line) - 28.4).abs() < 1e-9);
    }

    #[test]
    fn test_receiver_line_with_bonus() {
        let rules = ScoringRules::default();
        let line =
            StatLine { receptions: 8, rec_yards: 104.0, rec_tds: 1, ..Default::default() };
        // 8 + 10.4 + 6 + 3
        assert!((rules.score(&line) - 27.4).abs() < 1e-9);
    }

    #[test]
    fn test_points_allowed_tiers() {
        let rules = ScoringRules::default();
        assert_eq!(rules.points_allowed_score(0.0), 10.0);
        assert_eq!(rules.points_allowed_score(0.4), 10.0);
        assert_eq!(rules.points_allowed_score(3.0), 7.0);
        assert_eq!(rules.points_allowed_score(13.0), 4.0);
        assert_eq!(rules.points_allowed_score(24.0), 0.0);
        assert_eq!(rules.points_allowed_score(34.0), -1.0);
        assert_eq!(rules.points_allowed_score(41.0), -4.0);
    }

    #[test]
    fn test_floor_at_zero() {
        let rules = ScoringRules::default();
        let line = StatLine { interceptions: 3, ..Default::default() };
        assert_eq!(rules.score(&line), 0.0);

        let raw = ScoringRules { floor_at_zero: false, ..ScoringRules::default() };
        assert_eq!(raw.score(&line), -3.0);
    }
}
