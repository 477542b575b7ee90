use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fantasy roster position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    DST,
}

impl Position {
    /// All positions in display order
    pub const ALL: [Position; 5] =
        [Position::QB, Position::RB, Position::WR, Position::TE, Position::DST];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::DST => "DST",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = UnknownPosition;

    /// Parse a site position code. Sites disagree on the defense label, so
    /// `D`, `DEF` and `D/ST` all map to `DST`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QB" => Ok(Position::QB),
            "RB" => Ok(Position::RB),
            "WR" => Ok(Position::WR),
            "TE" => Ok(Position::TE),
            "DST" | "D" | "DEF" | "D/ST" => Ok(Position::DST),
            _ => Err(UnknownPosition(s.to_string())),
        }
    }
}

/// Position code that is not part of the DFS roster set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPosition(pub String);

impl fmt::Display for UnknownPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown position '{}'", self.0)
    }
}

impl std::error::Error for UnknownPosition {}

/// Team-level baseline built from historical games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPrior {
    /// Team abbreviation (e.g., "BUF")
    pub team: String,

    /// Offensive plays per game
    pub pace: f64,

    /// Neutral-situation pass rate (0..1)
    pub pass_rate: f64,

    /// Points scored per game
    pub scoring_rate: f64,

    /// Game-to-game standard deviation of pace, as a fraction of pace
    #[serde(default = "default_pace_sd")]
    pub pace_sd: f64,

    /// Game-to-game standard deviation of pass rate, as a fraction of pass rate
    #[serde(default = "default_pass_rate_sd")]
    pub pass_rate_sd: f64,

    /// Game-to-game standard deviation of offensive efficiency
    #[serde(default = "default_efficiency_sd")]
    pub efficiency_sd: f64,
}

fn default_pace_sd() -> f64 {
    0.08
}

fn default_pass_rate_sd() -> f64 {
    0.05
}

fn default_efficiency_sd() -> f64 {
    0.15
}

impl TeamPrior {
    /// League-average team, used when a slate team has no baseline
    pub fn league_average(team: &str) -> Self {
        Self {
            team: team.to_string(),
            pace: 63.0,
            pass_rate: 0.58,
            scoring_rate: 22.0,
            pace_sd: default_pace_sd(),
            pass_rate_sd: default_pass_rate_sd(),
            efficiency_sd: default_efficiency_sd(),
        }
    }
}

/// Mean and standard deviation of a per-game quantity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dist {
    pub mean: f64,
    pub sd: f64,
}

impl Dist {
    pub const fn new(mean: f64, sd: f64) -> Self {
        Self { mean, sd }
    }

    pub const fn zero() -> Self {
        Self { mean: 0.0, sd: 0.0 }
    }
}

/// Share of team opportunities a player commands
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UsagePrior {
    /// Share of team pass attempts (quarterbacks)
    #[serde(default)]
    pub pass_attempt_share: Dist,

    /// Share of team targets
    #[serde(default)]
    pub target_share: Dist,

    /// Share of team carries
    #[serde(default)]
    pub carry_share: Dist,
}

/// Per-opportunity production rates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EfficiencyPrior {
    #[serde(default)]
    pub yards_per_attempt: Dist,

    #[serde(default)]
    pub yards_per_target: Dist,

    #[serde(default)]
    pub yards_per_carry: Dist,

    /// Receptions per target
    #[serde(default)]
    pub catch_rate: f64,

    /// Passing touchdowns per attempt
    #[serde(default)]
    pub pass_td_rate: f64,

    /// Interceptions per attempt
    #[serde(default)]
    pub int_rate: f64,

    /// Rushing touchdowns per carry
    #[serde(default)]
    pub rush_td_rate: f64,

    /// Receiving touchdowns per target
    #[serde(default)]
    pub rec_td_rate: f64,
}

/// Defense/special-teams production per game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefensePrior {
    pub sacks_per_game: f64,

    /// Interceptions plus fumble recoveries per game
    pub takeaways_per_game: f64,

    /// Defensive/return touchdowns per takeaway
    pub def_td_rate: f64,
}

impl Default for DefensePrior {
    fn default() -> Self {
        Self { sacks_per_game: 2.4, takeaways_per_game: 1.3, def_td_rate: 0.08 }
    }
}

/// Player-level baseline built from historical games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPrior {
    /// Stable player key (see [`crate::hashing::player_key`])
    pub player_id: String,

    /// Player name (e.g., "Josh Allen")
    pub name: String,

    /// Team abbreviation
    pub team: String,

    pub position: Position,

    /// Games in the historical sample
    #[serde(default)]
    pub games_sampled: u32,

    /// First-year player; history is from another level or absent
    #[serde(default)]
    pub rookie: bool,

    #[serde(default)]
    pub usage: UsagePrior,

    #[serde(default)]
    pub efficiency: EfficiencyPrior,

    /// Only present for DST units
    #[serde(default)]
    pub defense: Option<DefensePrior>,

    /// Historical DK points per game
    #[serde(default)]
    pub points_per_game: f64,
}

impl PlayerPrior {
    /// Whether the historical sample can carry a simulation on its own
    pub fn has_usable_history(&self, min_games: u32) -> bool {
        !self.rookie && self.games_sampled >= min_games
    }
}

/// Container for a team prior file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamPriorData {
    /// Seasons the baseline was built from (e.g., "2023-2024")
    pub seasons: String,
    /// When the baseline was built
    pub built_at: DateTime<Utc>,
    pub teams: Vec<TeamPrior>,
}

/// Container for a player prior file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPriorData {
    pub seasons: String,
    pub built_at: DateTime<Utc>,
    pub players: Vec<PlayerPrior>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parsing() {
        assert_eq!("qb".parse::<Position>().unwrap(), Position::QB);
        assert_eq!(" WR ".parse::<Position>().unwrap(), Position::WR);
        assert_eq!("D".parse::<Position>().unwrap(), Position::DST);
        assert_eq!("D/ST".parse::<Position>().unwrap(), Position::DST);
        assert!("K".parse::<Position>().is_err());
    }

    #[test]
    fn test_team_prior_variance_defaults() {
        let json = r#"{"team":"BUF","pace":65.0,"pass_rate":0.6,"scoring_rate":27.1}"#;
        let prior: TeamPrior = serde_json::from_str(json).unwrap();
        assert_eq!(prior.pace_sd, 0.08);
        assert_eq!(prior.efficiency_sd, 0.15);
    }

    #[test]
    fn test_usable_history() {
        let prior = PlayerPrior {
            player_id: "BUF_QB_JOSH_ALLEN".to_string(),
            name: "Josh Allen".to_string(),
            team: "BUF".to_string(),
            position: Position::QB,
            games_sampled: 2,
            rookie: false,
            usage: UsagePrior::default(),
            efficiency: EfficiencyPrior::default(),
            defense: None,
            points_per_game: 24.0,
        };
        assert!(!prior.has_usable_history(3));
        assert!(prior.has_usable_history(2));
        assert!(!PlayerPrior { rookie: true, ..prior }.has_usable_history(0));
    }
}
