//! Position outcome models
//!
//! A model turns a player's prior plus the environment and usage realized at
//! one draw index into a stat line. Each model reads the same [`TeamDraw`]
//! its teammates read, so a strong game shock lifts the whole offense.

use crate::config::EnvironmentConfig;
use crate::environment::TeamDraw;
use crate::sampling::{binomial_count, normal_floor, poisson_count, unit_lognormal};
use crate::scoring::{ScoringRules, StatLine};
use crate::seeding::SimRng;
use crate::usage::UsageDraw;
use prior_store::{PlayerPrior, Position};
use serde::{Deserialize, Serialize};

/// Everything a model may read at one draw index
#[derive(Debug, Clone, Copy)]
pub struct DrawInput<'a> {
    /// The player's own team
    pub own: &'a TeamDraw,

    /// The team across the field
    pub opponent: &'a TeamDraw,

    pub usage: UsageDraw,
}

/// Shared parameters for every model in a run
#[derive(Debug, Clone, Copy)]
pub struct ModelParams<'a> {
    pub scoring: &'a ScoringRules,
    pub environment: &'a EnvironmentConfig,
}

/// Fantasy outcome model for one position group
pub trait OutcomeModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Simulated box score at one draw index
    fn stat_line(
        &self,
        prior: &PlayerPrior,
        input: &DrawInput<'_>,
        params: &ModelParams<'_>,
        rng: &mut SimRng,
    ) -> StatLine;

    /// Fantasy points at one draw index
    fn points(
        &self,
        prior: &PlayerPrior,
        input: &DrawInput<'_>,
        params: &ModelParams<'_>,
        rng: &mut SimRng,
    ) -> f64 {
        params.scoring.score(&self.stat_line(prior, input, params, rng))
    }
}

pub struct QuarterbackModel;
pub struct RunningBackModel;
pub struct PassCatcherModel;
pub struct DefenseModel;

/// Model for a roster position
pub fn model_for(position: Position) -> &'static dyn OutcomeModel {
    match position {
        Position::QB => &QuarterbackModel,
        Position::RB => &RunningBackModel,
        Position::WR | Position::TE => &PassCatcherModel,
        Position::DST => &DefenseModel,
    }
}

/// Plays that go to the player: each of the team's plays in the channel is
/// a trial at the player's share
fn opportunities(rng: &mut SimRng, volume: f64, share: f64) -> u32 {
    let plays = volume.round().max(0.0) as u32;
    binomial_count(rng, plays, share)
}

fn passing(prior: &PlayerPrior, input: &DrawInput<'_>, rng: &mut SimRng, line: &mut StatLine) {
    let own = input.own;
    let attempts = opportunities(rng, own.pass_attempts(), input.usage.pass_share);
    if attempts == 0 {
        return;
    }

    let eff = &prior.efficiency;
    let yards_per_attempt = normal_floor(rng, eff.yards_per_attempt) * own.efficiency;
    line.pass_yards = attempts as f64 * yards_per_attempt;
    line.pass_tds = poisson_count(rng, attempts as f64 * eff.pass_td_rate * own.scoring_env);
    line.interceptions = poisson_count(rng, attempts as f64 * eff.int_rate / own.efficiency);
}

fn rushing(prior: &PlayerPrior, input: &DrawInput<'_>, rng: &mut SimRng, line: &mut StatLine) {
    let own = input.own;
    let carries = opportunities(rng, own.rush_attempts(), input.usage.carry_share);
    if carries == 0 {
        return;
    }

    let eff = &prior.efficiency;
    let yards_per_carry = normal_floor(rng, eff.yards_per_carry) * own.efficiency;
    line.rush_yards = carries as f64 * yards_per_carry;
    line.rush_tds = poisson_count(rng, carries as f64 * eff.rush_td_rate * own.scoring_env);
}

fn receiving(prior: &PlayerPrior, input: &DrawInput<'_>, rng: &mut SimRng, line: &mut StatLine) {
    let own = input.own;
    let targets = opportunities(rng, own.pass_attempts(), input.usage.target_share);
    if targets == 0 {
        return;
    }

    let eff = &prior.efficiency;
    let receptions = binomial_count(rng, targets, eff.catch_rate);
    let yards_per_target = normal_floor(rng, eff.yards_per_target) * own.efficiency;
    line.receptions = receptions;
    if eff.catch_rate > 0.0 {
        line.rec_yards = receptions as f64 * yards_per_target / eff.catch_rate.min(1.0);
    }

    // A touchdown needs a catch
    let tds = poisson_count(rng, targets as f64 * eff.rec_td_rate * own.scoring_env);
    line.rec_tds = tds.min(receptions);
}

impl OutcomeModel for QuarterbackModel {
    fn name(&self) -> &'static str {
        "quarterback"
    }

    fn stat_line(
        &self,
        prior: &PlayerPrior,
        input: &DrawInput<'_>,
        _params: &ModelParams<'_>,
        rng: &mut SimRng,
    ) -> StatLine {
        let mut line = StatLine::default();
        passing(prior, input, rng, &mut line);
        rushing(prior, input, rng, &mut line);
        line
    }
}

impl OutcomeModel for RunningBackModel {
    fn name(&self) -> &'static str {
        "running_back"
    }

    fn stat_line(
        &self,
        prior: &PlayerPrior,
        input: &DrawInput<'_>,
        _params: &ModelParams<'_>,
        rng: &mut SimRng,
    ) -> StatLine {
        let mut line = StatLine::default();
        rushing(prior, input, rng, &mut line);
        receiving(prior, input, rng, &mut line);
        line
    }
}

impl OutcomeModel for PassCatcherModel {
    fn name(&self) -> &'static str {
        "pass_catcher"
    }

    fn stat_line(
        &self,
        prior: &PlayerPrior,
        input: &DrawInput<'_>,
        _params: &ModelParams<'_>,
        rng: &mut SimRng,
    ) -> StatLine {
        let mut line = StatLine::default();
        receiving(prior, input, rng, &mut line);
        rushing(prior, input, rng, &mut line);
        line
    }
}

impl OutcomeModel for DefenseModel {
    fn name(&self) -> &'static str {
        "defense"
    }

    /// Reads the opponent's draw: pass-heavy offenses take more sacks and
    /// efficient ones give the ball away less.
    fn stat_line(
        &self,
        prior: &PlayerPrior,
        input: &DrawInput<'_>,
        params: &ModelParams<'_>,
        rng: &mut SimRng,
    ) -> StatLine {
        let defense = prior.defense.unwrap_or_default();
        let opponent = input.opponent;
        let pass_factor = opponent.pass_rate / params.environment.league_avg_pass_rate;
        let efficiency = opponent.efficiency.max(0.1);

        let sacks = poisson_count(rng, defense.sacks_per_game * pass_factor / efficiency);
        let takeaways = poisson_count(rng, defense.takeaways_per_game / efficiency);
        let def_tds = binomial_count(rng, takeaways, defense.def_td_rate);

        StatLine {
            sacks,
            takeaways,
            def_tds,
            points_allowed: Some(opponent.points),
            ..Default::default()
        }
    }
}

/// Length-N fantasy points for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerOutcomeVector {
    pub player_id: String,
    pub points: Vec<f64>,
}

/// Run a model across every draw index
pub fn simulate_player(
    model: &dyn OutcomeModel,
    prior: &PlayerPrior,
    own: &[TeamDraw],
    opponent: &[TeamDraw],
    usage: &[UsageDraw],
    params: &ModelParams<'_>,
    rng: &mut SimRng,
) -> Vec<f64> {
    own.iter()
        .zip(opponent)
        .enumerate()
        .map(|(i, (own, opponent))| {
            let usage = usage.get(i).copied().unwrap_or_default();
            let input = DrawInput { own, opponent, usage };
            model.points(prior, &input, params, rng)
        })
        .collect()
}

/// Outcomes for a player without usable history: the site projection scaled
/// by a unit-mean lognormal and the team's efficiency at each index.
pub fn simulate_fallback(
    site_projection: f64,
    sigma: f64,
    team: &[TeamDraw],
    rng: &mut SimRng,
) -> Vec<f64> {
    team.iter()
        .map(|draw| (site_projection * unit_lognormal(rng, sigma) * draw.efficiency).max(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeding::{stream, Stage};
    use prior_store::{Dist, EfficiencyPrior, UsagePrior};

    fn draw(points: f64) -> TeamDraw {
        TeamDraw { plays: 64.0, pass_rate: 0.6, scoring_env: 1.0, efficiency: 1.0, points }
    }

    fn prior(position: Position) -> PlayerPrior {
        PlayerPrior {
            player_id: format!("TST_{position}"),
            name: "Test".to_string(),
            team: "TST".to_string(),
            position,
            games_sampled: 17,
            rookie: false,
            usage: UsagePrior::default(),
            efficiency: EfficiencyPrior {
                yards_per_attempt: Dist::new(7.2, 1.0),
                yards_per_target: Dist::new(8.5, 2.0),
                yards_per_carry: Dist::new(4.4, 1.0),
                catch_rate: 0.68,
                pass_td_rate: 0.05,
                int_rate: 0.022,
                rush_td_rate: 0.035,
                rec_td_rate: 0.05,
            },
            defense: None,
            points_per_game: 0.0,
        }
    }

    fn params<'a>(scoring: &'a ScoringRules, env: &'a EnvironmentConfig) -> ModelParams<'a> {
        ModelParams { scoring, environment: env }
    }

    #[test]
    fn test_dispatch() {
        assert_eq!(model_for(Position::QB).name(), "quarterback");
        assert_eq!(model_for(Position::RB).name(), "running_back");
        assert_eq!(model_for(Position::WR).name(), "pass_catcher");
        assert_eq!(model_for(Position::TE).name(), "pass_catcher");
        assert_eq!(model_for(Position::DST).name(), "defense");
    }

    #[test]
    fn test_quarterback_volume_follows_usage() {
        let (scoring, env) = (ScoringRules::default(), EnvironmentConfig::default());
        let own = draw(24.0);
        let opp = draw(20.0);
        let prior = prior(Position::QB);
        let mut rng = stream(1, Stage::Outcome, &prior.player_id);

        let starter = UsageDraw { pass_share: 0.95, target_share: 0.0, carry_share: 0.08 };
        let input = DrawInput { own: &own, opponent: &opp, usage: starter };
        let line = QuarterbackModel.stat_line(&prior, &input, &params(&scoring, &env), &mut rng);
        assert!(line.pass_yards > 0.0);
        assert_eq!(line.receptions, 0);

        let backup = UsageDraw::default();
        let input = DrawInput { own: &own, opponent: &opp, usage: backup };
        let line = QuarterbackModel.stat_line(&prior, &input, &params(&scoring, &env), &mut rng);
        assert_eq!(line, StatLine::default());
    }

    #[test]
    fn test_receiving_tds_need_receptions() {
        let (scoring, env) = (ScoringRules::default(), EnvironmentConfig::default());
        let own = draw(24.0);
        let prior = prior(Position::WR);
        let mut rng = stream(3, Stage::Outcome, &prior.player_id);
        let usage = UsageDraw { pass_share: 0.0, target_share: 0.25, carry_share: 0.0 };
        let input = DrawInput { own: &own, opponent: &own, usage };

        for _ in 0..2000 {
            let line = PassCatcherModel.stat_line(&prior, &input, &params(&scoring, &env), &mut rng);
            assert!(line.rec_tds <= line.receptions);
            assert!(line.rec_yards >= 0.0);
            assert_eq!(line.pass_yards, 0.0);
        }
    }

    #[test]
    fn test_low_share_opportunities_track_expected_volume() {
        let own = draw(24.0);
        let volume = own.pass_attempts();
        let share = 0.012;
        let mut rng = stream(13, Stage::Outcome, "TST_TE2");

        let n = 20_000;
        let targets: Vec<u32> = (0..n).map(|_| opportunities(&mut rng, volume, share)).collect();
        let mean = targets.iter().sum::<u32>() as f64 / n as f64;
        let expected = volume.round() * share;
        assert!((mean - expected).abs() < 0.03, "mean {mean} vs expected {expected}");

        let nonzero = targets.iter().filter(|t| **t > 0).count() as f64 / n as f64;
        assert!(nonzero > 0.3, "only {nonzero} of draws had a target");
        assert_eq!(opportunities(&mut rng, volume, 0.0), 0);
    }

    #[test]
    fn test_low_share_receiving_is_not_zeroed() {
        let (scoring, env) = (ScoringRules::default(), EnvironmentConfig::default());
        let own = draw(24.0);
        let prior = prior(Position::TE);
        let mut rng = stream(15, Stage::Outcome, &prior.player_id);
        let usage = UsageDraw { pass_share: 0.0, target_share: 0.008, carry_share: 0.0 };
        let input = DrawInput { own: &own, opponent: &own, usage };

        let n = 20_000;
        let receptions: u32 = (0..n)
            .map(|_| PassCatcherModel.stat_line(&prior, &input, &params(&scoring, &env), &mut rng))
            .map(|line| line.receptions)
            .sum();
        let mean = receptions as f64 / n as f64;
        let expected = own.pass_attempts().round() * 0.008 * prior.efficiency.catch_rate;
        assert!((mean - expected).abs() < 0.03, "mean {mean} vs expected {expected}");
    }

    #[test]
    fn test_defense_reads_opponent_points() {
        let (scoring, env) = (ScoringRules::default(), EnvironmentConfig::default());
        let own = draw(35.0);
        let shutout = draw(0.0);
        let prior = prior(Position::DST);
        let mut rng = stream(5, Stage::Outcome, &prior.player_id);
        let input = DrawInput { own: &own, opponent: &shutout, usage: UsageDraw::default() };

        let line = DefenseModel.stat_line(&prior, &input, &params(&scoring, &env), &mut rng);
        assert_eq!(line.points_allowed, Some(0.0));
        assert!(DefenseModel.points(&prior, &input, &params(&scoring, &env), &mut rng) >= 10.0);
    }

    #[test]
    fn test_simulate_player_is_non_negative_and_sized() {
        let (scoring, env) = (ScoringRules::default(), EnvironmentConfig::default());
        let own = vec![draw(24.0); 500];
        let opp = vec![draw(17.0); 500];
        let usage = vec![UsageDraw { pass_share: 0.0, target_share: 0.1, carry_share: 0.6 }; 500];
        let prior = prior(Position::RB);
        let mut rng = stream(9, Stage::Outcome, &prior.player_id);

        let points = simulate_player(
            model_for(Position::RB),
            &prior,
            &own,
            &opp,
            &usage,
            &params(&scoring, &env),
            &mut rng,
        );
        assert_eq!(points.len(), 500);
        assert!(points.iter().all(|p| *p >= 0.0 && p.is_finite()));
        let mean = points.iter().sum::<f64>() / 500.0;
        assert!(mean > 5.0);
    }

    #[test]
    fn test_fallback_centers_on_projection() {
        let team = vec![draw(22.0); 20_000];
        let mut rng = stream(11, Stage::Fallback, "ROOKIE");
        let points = simulate_fallback(15.0, 0.55 * 1.3, &team, &mut rng);
        let mean = points.iter().sum::<f64>() / points.len() as f64;
        assert!((mean - 15.0).abs() < 0.5);
    }
}
