//! Configuration for the simulation engine

use crate::error::SimError;
use crate::scoring::ScoringRules;
use crate::{DEFAULT_MIN_STABLE_DRAWS, DEFAULT_N_DRAWS, DEFAULT_SEED};
use prior_store::Position;
use serde::{Deserialize, Serialize};

/// Configuration for a simulation engine instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Run identity and resolution
    #[serde(default)]
    pub run: RunConfig,

    /// Game environment model
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Usage allocation
    #[serde(default)]
    pub usage: UsageConfig,

    /// Fantasy scoring rules
    #[serde(default)]
    pub scoring: ScoringRules,

    /// Rookie / unknown-history fallback
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Run cache
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Identity and resolution of a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub season: i32,
    pub week: u32,

    /// Run seed; every stochastic stream is derived from it
    pub seed: u64,

    /// Draws per player. More draws sharpen percentiles at linear cost.
    pub n_draws: usize,

    /// Below this many draws percentiles are reported as absent
    pub min_stable_draws: usize,

    /// Keep raw outcome vectors in the run output
    pub retain_outcomes: bool,

    /// Worker threads (None = one per core)
    pub threads: Option<usize>,
}

/// Game environment parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// League-average game total (both teams)
    pub league_avg_total: f64,

    /// League-average points per team
    pub league_avg_team_points: f64,

    /// League-average pass rate
    pub league_avg_pass_rate: f64,

    /// Fraction of the total's deviation from average that moves pace
    pub pace_total_sensitivity: f64,

    /// Pass-rate change per point of spread (positive spread = underdog)
    pub spread_pass_sensitivity: f64,

    /// Weight of Vegas-implied points against the team's scoring prior
    pub vegas_weight: f64,

    /// Standard deviation of the shared game shock
    pub game_shock_sd: f64,

    /// Shocks are bounded to this many standard deviations
    pub shock_bound_sd: f64,

    /// Shock widening when Vegas inputs or team priors are missing
    pub missing_vegas_widening: f64,

    /// Standard deviation of realized team points around the environment
    pub points_sd: f64,

    pub min_pass_rate: f64,
    pub max_pass_rate: f64,
}

/// Usage allocation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageConfig {
    /// Cap on any single player's share of a team channel
    pub max_share: f64,
}

/// Per-position scalar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFactors {
    pub qb: f64,
    pub rb: f64,
    pub wr: f64,
    pub te: f64,
    pub dst: f64,
}

impl PositionFactors {
    pub fn get(&self, position: Position) -> f64 {
        match position {
            Position::QB => self.qb,
            Position::RB => self.rb,
            Position::WR => self.wr,
            Position::TE => self.te,
            Position::DST => self.dst,
        }
    }
}

/// Rookie / unknown-history fallback parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Minimum historical games for a prior to be used directly
    pub min_games: u32,

    /// Coefficient of variation of a typical player at each position
    pub base_cv: PositionFactors,

    /// Extra spread for players without history
    pub widening: PositionFactors,
}

/// Run cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            season: 2025,
            week: 1,
            seed: DEFAULT_SEED,
            n_draws: DEFAULT_N_DRAWS,
            min_stable_draws: DEFAULT_MIN_STABLE_DRAWS,
            retain_outcomes: false,
            threads: None,
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            league_avg_total: 44.0,
            league_avg_team_points: 22.0,
            league_avg_pass_rate: 0.58,
            pace_total_sensitivity: 0.3,
            spread_pass_sensitivity: 0.006,
            vegas_weight: 0.7,
            game_shock_sd: 0.10,
            shock_bound_sd: 2.5,
            missing_vegas_widening: 1.5,
            points_sd: 7.0,
            min_pass_rate: 0.35,
            max_pass_rate: 0.75,
        }
    }
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self { max_share: 0.95 }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            min_games: 3,
            base_cv: PositionFactors { qb: 0.35, rb: 0.50, wr: 0.55, te: 0.60, dst: 0.65 },
            widening: PositionFactors { qb: 1.2, rb: 1.3, wr: 1.3, te: 1.35, dst: 1.2 },
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true, max_entries: 16 }
    }
}

impl EngineConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Worker threads for a run
    pub fn thread_count(&self) -> usize {
        self.run.threads.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<(), SimError> {
        if self.run.n_draws == 0 {
            return Err(SimError::ZeroDraws);
        }
        if self.run.threads == Some(0) {
            return Err(SimError::Config("threads must be at least 1".to_string()));
        }

        let env = &self.environment;
        let positive = [
            ("league_avg_total", env.league_avg_total),
            ("league_avg_team_points", env.league_avg_team_points),
            ("league_avg_pass_rate", env.league_avg_pass_rate),
            ("missing_vegas_widening", env.missing_vegas_widening),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("game_shock_sd", env.game_shock_sd),
            ("shock_bound_sd", env.shock_bound_sd),
            ("points_sd", env.points_sd),
            ("pace_total_sensitivity", env.pace_total_sensitivity),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::Config(format!("{name} must be non-negative, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&env.vegas_weight) {
            return Err(SimError::Config(format!(
                "vegas_weight must be within [0, 1], got {}",
                env.vegas_weight
            )));
        }
        let pass_rate_ordered = 0.0 < env.min_pass_rate
            && env.min_pass_rate < env.max_pass_rate
            && env.max_pass_rate < 1.0;
        if !pass_rate_ordered {
            return Err(SimError::Config(format!(
                "pass rate bounds must satisfy 0 < min < max < 1, got [{}, {}]",
                env.min_pass_rate, env.max_pass_rate
            )));
        }
        if !(self.usage.max_share > 0.0 && self.usage.max_share <= 1.0) {
            return Err(SimError::Config(format!(
                "max_share must be within (0, 1], got {}",
                self.usage.max_share
            )));
        }
        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(SimError::Config("cache.max_entries must be at least 1".to_string()));
        }

        Ok(())
    }
}
