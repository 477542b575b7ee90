//! Game environment simulation
//!
//! Each matchup gets N paired [`TeamDraw`]s. A single bounded game shock per
//! draw index moves both teams' pace and scoring together, which is where
//! same-game correlation between players comes from.

use crate::config::EnvironmentConfig;
use crate::sampling::bounded_shock;
use crate::seeding::{stream, Stage};
use crate::slate::matchup_key;
use prior_store::TeamPrior;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Vegas line for a game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VegasLine {
    /// Over/under for the game
    pub total: f64,

    /// Spread from the first team's perspective (negative = favorite)
    pub spread: f64,
}

/// Adjusted means for one side of a matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEnvironment {
    pub prior: TeamPrior,

    /// Mean offensive plays
    pub plays_mean: f64,

    /// Mean pass rate after the spread adjustment
    pub pass_rate_mean: f64,

    /// Expected points after blending Vegas with the prior
    pub implied_points: f64,

    /// Expected points relative to a league-average team
    pub scoring_env_mean: f64,
}

impl TeamEnvironment {
    pub fn team(&self) -> &str {
        &self.prior.team
    }
}

/// Two teams plus the line between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameContext {
    /// Sorted team ids joined with `@`
    pub key: String,

    /// Teams in key order
    pub teams: [TeamEnvironment; 2],

    /// Line with the spread from `teams[0]`'s perspective
    pub vegas: Option<VegasLine>,

    /// Multiplier on every shock standard deviation
    pub shock_scale: f64,
}

impl GameContext {
    /// Build a context. `vegas.spread` is from `team_a`'s perspective.
    pub fn new(
        team_a: TeamPrior,
        team_b: TeamPrior,
        vegas: Option<VegasLine>,
        config: &EnvironmentConfig,
    ) -> Self {
        let (first, second, vegas) = if team_a.team <= team_b.team {
            (team_a, team_b, vegas)
        } else {
            let flipped = vegas.map(|line| VegasLine { total: line.total, spread: -line.spread });
            (team_b, team_a, flipped)
        };

        let key = matchup_key(&first.team, &second.team);
        let game_pace = 0.5 * (first.pace + second.pace);
        let pace_multiplier = vegas
            .map(|line| {
                let total_factor = line.total / config.league_avg_total;
                1.0 + (total_factor - 1.0) * config.pace_total_sensitivity
            })
            .unwrap_or(1.0);

        let first_spread = vegas.map(|line| line.spread);
        let second_spread = first_spread.map(|spread| -spread);
        let teams = [
            team_environment(first, first_spread, vegas, game_pace, pace_multiplier, config),
            team_environment(second, second_spread, vegas, game_pace, pace_multiplier, config),
        ];

        let shock_scale = if vegas.is_some() { 1.0 } else { config.missing_vegas_widening };
        Self { key, teams, vegas, shock_scale }
    }

    /// Widen every shock for a game missing a team baseline
    pub fn with_widened_shocks(mut self, config: &EnvironmentConfig) -> Self {
        self.shock_scale = config.missing_vegas_widening;
        self
    }

    /// Index of a team in `teams`
    pub fn team_index(&self, team: &str) -> Option<usize> {
        self.teams.iter().position(|env| env.team() == team)
    }
}

fn team_environment(
    prior: TeamPrior,
    spread: Option<f64>,
    vegas: Option<VegasLine>,
    game_pace: f64,
    pace_multiplier: f64,
    config: &EnvironmentConfig,
) -> TeamEnvironment {
    let plays_mean = 0.5 * (prior.pace + game_pace) * pace_multiplier;

    let pass_rate_mean = (prior.pass_rate
        + spread.map(|s| s * config.spread_pass_sensitivity).unwrap_or(0.0))
    .clamp(config.min_pass_rate, config.max_pass_rate);

    let implied_points = match (vegas, spread) {
        (Some(line), Some(spread)) => {
            let vegas_points = line.total / 2.0 - spread / 2.0;
            config.vegas_weight * vegas_points + (1.0 - config.vegas_weight) * prior.scoring_rate
        }
        _ => prior.scoring_rate,
    }
    .max(0.0);

    let scoring_env_mean = implied_points / config.league_avg_team_points;

    TeamEnvironment { prior, plays_mean, pass_rate_mean, implied_points, scoring_env_mean }
}

/// Realized environment for one team at one draw index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamDraw {
    pub plays: f64,
    pub pass_rate: f64,

    /// Multiplier on touchdown rates (1.0 = league average)
    pub scoring_env: f64,

    /// Multiplier on yards per opportunity
    pub efficiency: f64,

    /// Points the team scores
    pub points: f64,
}

impl TeamDraw {
    pub fn pass_attempts(&self) -> f64 {
        self.plays * self.pass_rate
    }

    pub fn rush_attempts(&self) -> f64 {
        self.plays * (1.0 - self.pass_rate)
    }
}

/// All environment draws for one matchup
#[derive(Debug, Clone)]
pub struct MatchupDraws {
    pub key: String,
    pub teams: [String; 2],
    pub draws: [Vec<TeamDraw>; 2],

    /// Shared game shock at each index
    pub game_shocks: Vec<f64>,
}

impl MatchupDraws {
    /// Draw series for a team in this game
    pub fn series(&self, team: &str) -> Option<&[TeamDraw]> {
        self.teams.iter().position(|t| t == team).map(|i| self.draws[i].as_slice())
    }

    /// Draw series for the team across the field from `team`
    pub fn opponent_series(&self, team: &str) -> Option<&[TeamDraw]> {
        self.teams.iter().position(|t| t == team).map(|i| self.draws[1 - i].as_slice())
    }

    pub fn n_draws(&self) -> usize {
        self.game_shocks.len()
    }
}

/// Simulate `n_draws` environment pairs for a game.
///
/// The stream is keyed by the matchup, and values are drawn in a fixed order
/// per index, so the output depends only on `(seed, context, n_draws)`.
pub fn simulate_environment(
    context: &GameContext,
    seed: u64,
    n_draws: usize,
    config: &EnvironmentConfig,
) -> MatchupDraws {
    let mut rng = stream(seed, Stage::Environment, &context.key);
    let scale = context.shock_scale;
    let bound = config.shock_bound_sd;

    let mut game_shocks = Vec::with_capacity(n_draws);
    let mut draws = [Vec::with_capacity(n_draws), Vec::with_capacity(n_draws)];

    for _ in 0..n_draws {
        let game = bounded_shock(&mut rng, config.game_shock_sd * scale, bound);
        game_shocks.push(game);

        for (side, env) in context.teams.iter().enumerate() {
            let prior = &env.prior;
            let pace_noise = bounded_shock(&mut rng, prior.pace_sd * scale, bound);
            let pass_noise = bounded_shock(&mut rng, prior.pass_rate_sd * scale, bound);
            let efficiency_noise = bounded_shock(&mut rng, prior.efficiency_sd * scale, bound);
            let points_noise = bounded_shock(&mut rng, config.points_sd * scale, bound);

            let plays = (env.plays_mean * (1.0 + game + pace_noise)).max(1.0);
            let pass_rate = (env.pass_rate_mean * (1.0 + pass_noise))
                .clamp(config.min_pass_rate, config.max_pass_rate);
            let efficiency = (1.0 + efficiency_noise).max(0.1);
            let scoring_env = (env.scoring_env_mean * (1.0 + game) * efficiency).max(0.05);
            let points = (scoring_env * config.league_avg_team_points + points_noise).max(0.0);

            draws[side].push(TeamDraw { plays, pass_rate, scoring_env, efficiency, points });
        }
    }

    debug!(
        "Simulated environment for {} ({} draws, shock scale {:.2})",
        context.key, n_draws, scale
    );

    MatchupDraws {
        key: context.key.clone(),
        teams: [context.teams[0].team().to_string(), context.teams[1].team().to_string()],
        draws,
        game_shocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prior(team: &str, pace: f64, pass_rate: f64, scoring_rate: f64) -> TeamPrior {
        TeamPrior { pace, pass_rate, scoring_rate, ..TeamPrior::league_average(team) }
    }

    fn mean(xs: impl Iterator<Item = f64>) -> f64 {
        let (sum, n) = xs.fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
        sum / n as f64
    }

    fn variance(xs: &[f64]) -> f64 {
        let m = xs.iter().sum::<f64>() / xs.len() as f64;
        xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64
    }

    #[test]
    fn test_context_is_sorted_and_spread_flipped() {
        let config = EnvironmentConfig::default();
        let ctx = GameContext::new(
            prior("MIA", 64.0, 0.6, 23.0),
            prior("BUF", 62.0, 0.58, 27.0),
            Some(VegasLine { total: 48.0, spread: 3.0 }),
            &config,
        );

        assert_eq!(ctx.key, "BUF@MIA");
        assert_eq!(ctx.teams[0].team(), "BUF");
        // MIA +3 means BUF -3
        assert_eq!(ctx.vegas.map(|v| v.spread), Some(-3.0));
        assert_eq!(ctx.shock_scale, 1.0);
    }

    #[test]
    fn test_vegas_adjusted_means() {
        let config = EnvironmentConfig::default();
        let ctx = GameContext::new(
            prior("BUF", 62.0, 0.58, 27.0),
            prior("MIA", 64.0, 0.60, 23.0),
            Some(VegasLine { total: 48.4, spread: -6.0 }),
            &config,
        );

        // total factor 1.1 -> pace multiplier 1.03
        let expected_plays = 0.5 * (62.0 + 63.0) * 1.03;
        assert!((ctx.teams[0].plays_mean - expected_plays).abs() < 1e-9);

        // favorite passes less, underdog more
        assert!((ctx.teams[0].pass_rate_mean - (0.58 - 0.036)).abs() < 1e-9);
        assert!((ctx.teams[1].pass_rate_mean - (0.60 + 0.036)).abs() < 1e-9);

        // implied 27.2 blended 0.7/0.3 with 27.0
        let implied = 0.7 * 27.2 + 0.3 * 27.0;
        assert!((ctx.teams[0].implied_points - implied).abs() < 1e-9);
        assert!((ctx.teams[0].scoring_env_mean - implied / 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_pass_rate_clamped() {
        let config = EnvironmentConfig::default();
        let ctx = GameContext::new(
            prior("AAA", 60.0, 0.74, 20.0),
            prior("BBB", 60.0, 0.36, 20.0),
            Some(VegasLine { total: 40.0, spread: 14.0 }),
            &config,
        );
        assert_eq!(ctx.teams[0].pass_rate_mean, config.max_pass_rate);
        assert_eq!(ctx.teams[1].pass_rate_mean, config.min_pass_rate);
    }

    #[test]
    fn test_draws_are_seeded_and_bounded() {
        let config = EnvironmentConfig::default();
        let ctx = GameContext::new(
            prior("BUF", 62.0, 0.58, 27.0),
            prior("MIA", 64.0, 0.60, 23.0),
            Some(VegasLine { total: 48.0, spread: -3.0 }),
            &config,
        );

        let a = simulate_environment(&ctx, 42, 2000, &config);
        let b = simulate_environment(&ctx, 42, 2000, &config);
        let c = simulate_environment(&ctx, 43, 2000, &config);
        assert_eq!(a.draws, b.draws);
        assert_ne!(a.draws, c.draws);
        assert_eq!(a.n_draws(), 2000);

        let bound = config.game_shock_sd * config.shock_bound_sd + 1e-12;
        assert!(a.game_shocks.iter().all(|g| g.abs() <= bound));
        for draw in a.draws.iter().flatten() {
            assert!(draw.plays >= 1.0);
            assert!((config.min_pass_rate..=config.max_pass_rate).contains(&draw.pass_rate));
            assert!(draw.points >= 0.0 && draw.points.is_finite());
        }

        let plays = mean(a.draws[0].iter().map(|d| d.plays));
        assert!((plays - ctx.teams[0].plays_mean).abs() / ctx.teams[0].plays_mean < 0.02);
    }

    #[test]
    fn test_shared_shock_correlates_teams() {
        let config = EnvironmentConfig::default();
        let ctx = GameContext::new(
            prior("BUF", 62.0, 0.58, 27.0),
            prior("MIA", 64.0, 0.60, 23.0),
            None,
            &config,
        );
        let draws = simulate_environment(&ctx, 7, 5000, &config);

        let a: Vec<f64> = draws.draws[0].iter().map(|d| d.plays).collect();
        let b: Vec<f64> = draws.draws[1].iter().map(|d| d.plays).collect();
        let (ma, mb) = (mean(a.iter().copied()), mean(b.iter().copied()));
        let cov = a.iter().zip(&b).map(|(x, y)| (x - ma) * (y - mb)).sum::<f64>() / a.len() as f64;
        assert!(cov / (variance(&a) * variance(&b)).sqrt() > 0.2);
    }

    #[test]
    fn test_missing_vegas_widens_shocks() {
        let config = EnvironmentConfig::default();
        let with_line = GameContext::new(
            prior("BUF", 63.0, 0.58, 22.0),
            prior("MIA", 63.0, 0.58, 22.0),
            Some(VegasLine { total: 44.0, spread: 0.0 }),
            &config,
        );
        let without = GameContext::new(
            prior("BUF", 63.0, 0.58, 22.0),
            prior("MIA", 63.0, 0.58, 22.0),
            None,
            &config,
        );
        assert_eq!(without.shock_scale, config.missing_vegas_widening);

        let a = simulate_environment(&with_line, 1, 5000, &config);
        let b = simulate_environment(&without, 1, 5000, &config);
        let plays_a: Vec<f64> = a.draws[0].iter().map(|d| d.plays).collect();
        let plays_b: Vec<f64> = b.draws[0].iter().map(|d| d.plays).collect();
        assert!(variance(&plays_b) > variance(&plays_a) * 1.5);
    }

    #[test]
    fn test_series_lookup() {
        let config = EnvironmentConfig::default();
        let ctx = GameContext::new(
            TeamPrior::league_average("KC"),
            TeamPrior::league_average("LV"),
            None,
            &config,
        );
        let draws = simulate_environment(&ctx, 1, 10, &config);
        assert_eq!(draws.series("KC").map(|s| s.len()), Some(10));
        assert_eq!(draws.opponent_series("KC"), draws.series("LV"));
        assert!(draws.series("DEN").is_none());

        assert_eq!(ctx.team_index("KC"), Some(0));
        assert_eq!(ctx.team_index("LV"), Some(1));
        assert_eq!(ctx.team_index("DEN"), None);
    }
}
