//! Simulation run orchestration
//!
//! A run validates the slate, groups players into matchups and simulates
//! each matchup as an independent unit on a rayon pool: environment draws
//! first, then usage, then player outcomes. Summaries are computed once all
//! outcome vectors exist.

use crate::cache::{inputs_hash, RunCache, RunKey};
use crate::config::EngineConfig;
use crate::environment::{simulate_environment, GameContext, VegasLine};
use crate::error::SimError;
use crate::outcome::{
    model_for, simulate_fallback, simulate_player, ModelParams, PlayerOutcomeVector,
};
use crate::seeding::{stream, Stage};
use crate::slate::{validate_slate, DefectKind, RecordDefect, SlatePlayer, ValidatedPlayer};
use crate::stats::RunStats;
use crate::summary::{summarize, PlayerSummary, SummaryOptions};
use crate::usage::{allocate_team_usage, UsageDraw, UsageParticipant};
use prior_store::{PlayerPrior, Position, PriorSnapshot, TeamPrior};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Identity of a simulation run; every realization in the run shares the
/// draw index space `0..n_draws`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub season: i32,
    pub week: u32,
    pub seed: u64,
    pub n_draws: usize,
}

impl SimulationRun {
    /// Human-readable run id, e.g. `2025_week_1_42_10000`
    pub fn run_id(&self) -> String {
        format!("{}_week_{}_{}_{}", self.season, self.week, self.seed, self.n_draws)
    }
}

/// A simulated slate player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPlayer {
    pub player: ValidatedPlayer,
    pub summary: PlayerSummary,
}

/// Result of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub run: SimulationRun,

    /// Simulated players in slate order
    pub players: Vec<SimulatedPlayer>,
    pub defects: Vec<RecordDefect>,

    /// Raw outcome vectors by player id, when retained
    pub outcomes: Option<BTreeMap<String, Vec<f64>>>,
    pub stats: RunStats,
    pub inputs_hash: u64,
}

impl RunOutput {
    pub fn player(&self, player_id: &str) -> Option<&SimulatedPlayer> {
        self.players.iter().find(|p| p.player.player_id == player_id)
    }
}

/// How a player's outcomes are produced
#[derive(Debug, Clone)]
enum Plan {
    Modeled(PlayerPrior),
    Fallback { site_projection: f64 },
}

#[derive(Debug, Clone)]
struct PlannedPlayer {
    player: ValidatedPlayer,
    plan: Plan,

    /// 0 or 1: which side of the matchup the player is on
    side: usize,
}

#[derive(Debug, Clone)]
struct Matchup {
    context: GameContext,
    players: Vec<PlannedPlayer>,
}

/// Seeded, parallel Monte Carlo engine
pub struct SimulationEngine {
    config: EngineConfig,
    cache: Option<RunCache>,
}

impl SimulationEngine {
    pub fn new(config: EngineConfig) -> Result<Self, SimError> {
        config.validate()?;
        let cache = config.cache.enabled.then(|| RunCache::new(config.cache.max_entries));
        Ok(Self { config, cache })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&RunCache> {
        self.cache.as_ref()
    }

    /// Simulate a slate against a prior snapshot
    pub fn run(
        &self,
        priors: &PriorSnapshot,
        slate: &[SlatePlayer],
    ) -> Result<Arc<RunOutput>, SimError> {
        let started = Instant::now();
        let run_config = &self.config.run;
        let run = SimulationRun {
            season: run_config.season,
            week: run_config.week,
            seed: run_config.seed,
            n_draws: run_config.n_draws,
        };

        let hash = inputs_hash(priors, slate, &self.config)?;
        let key = RunKey { inputs_hash: hash, seed: run.seed, n_draws: run.n_draws };
        if let Some(cached) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
            info!("Returning cached run {}", run.run_id());
            return Ok(cached);
        }

        info!(
            "Starting simulation run {} ({} slate records, {} draws)",
            run.run_id(),
            slate.len(),
            run.n_draws
        );

        // Validation and planning
        let (valid, mut defects) = validate_slate(slate);
        if valid.is_empty() {
            return Err(SimError::NoValidPlayers { rejected: defects.len() });
        }

        let planned = self.plan_players(priors, valid, &mut defects);
        if planned.is_empty() {
            if priors.is_empty() {
                return Err(SimError::NoUsablePriors);
            }
            let rejected = defects.iter().filter(|d| d.kind.is_rejection()).count();
            return Err(SimError::NoValidPlayers { rejected });
        }

        let matchups = self.build_matchups(priors, planned, &mut defects);
        let prepare_ms = started.elapsed().as_millis() as u64;
        for defect in &defects {
            warn!("Slate record {} ({}): {}", defect.record, defect.player, defect.kind);
        }

        // Simulation
        let threads = self.config.thread_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?;

        let simulate_started = Instant::now();
        let simulated: Vec<Vec<(PlannedPlayer, PlayerOutcomeVector)>> = pool.install(|| {
            matchups.par_iter().map(|matchup| self.simulate_matchup(matchup, run)).collect()
        });
        let simulate_elapsed = simulate_started.elapsed();

        // Summaries
        let summarize_started = Instant::now();
        let mut simulated: Vec<(PlannedPlayer, PlayerOutcomeVector)> =
            simulated.into_iter().flatten().collect();
        simulated.sort_by_key(|(planned, _)| planned.player.record);

        let summaries: Vec<PlayerSummary> = pool.install(|| {
            simulated
                .par_iter()
                .map(|(planned, outcomes)| self.summarize_player(priors, planned, outcomes))
                .collect::<Result<Vec<_>, SimError>>()
        })?;
        let summarize_ms = summarize_started.elapsed().as_millis() as u64;

        let fallbacks =
            simulated.iter().filter(|(p, _)| matches!(p.plan, Plan::Fallback { .. })).count();
        let outcomes = run_config.retain_outcomes.then(|| {
            simulated
                .iter()
                .map(|(_, vector)| (vector.player_id.clone(), vector.points.clone()))
                .collect::<BTreeMap<_, _>>()
        });
        let players: Vec<SimulatedPlayer> = simulated
            .into_iter()
            .zip(summaries)
            .map(|((planned, _), summary)| SimulatedPlayer { player: planned.player, summary })
            .collect();

        let mut stats = RunStats {
            matchups: matchups.len() as u32,
            players: players.len() as u32,
            fallbacks: fallbacks as u32,
            defects: defects.len() as u32,
            n_draws: run.n_draws,
            threads,
            prepare_ms,
            summarize_ms,
            ..Default::default()
        };
        stats.finish(simulate_elapsed, started.elapsed());
        stats.emit();

        let output =
            Arc::new(RunOutput { run, players, defects, outcomes, stats, inputs_hash: hash });
        if let Some(cache) = &self.cache {
            cache.insert(key, Arc::clone(&output));
        }
        Ok(output)
    }

    /// Decide per player between the position model and the projection fallback
    fn plan_players(
        &self,
        priors: &PriorSnapshot,
        players: Vec<ValidatedPlayer>,
        defects: &mut Vec<RecordDefect>,
    ) -> Vec<(ValidatedPlayer, Plan)> {
        let min_games = self.config.fallback.min_games;
        let mut planned = Vec::with_capacity(players.len());

        for player in players {
            let prior = priors.player(&player.player_id, &player.name, player.position);
            let plan = match (prior, player.site_projection) {
                (Some(prior), _) if prior.has_usable_history(min_games) => {
                    Plan::Modeled(prior.clone())
                }
                (_, Some(site_projection)) => {
                    debug!("Using projection fallback for {}", player.player_id);
                    Plan::Fallback { site_projection }
                }
                // Thin history still beats nothing when there is no projection
                (Some(prior), None) => Plan::Modeled(prior.clone()),
                (None, None) => {
                    defects.push(RecordDefect::new(
                        player.record,
                        player.player_id.clone(),
                        DefectKind::NoPriorOrProjection,
                    ));
                    continue;
                }
            };
            planned.push((player, plan));
        }

        planned
    }

    /// Group players by game and build each game's context
    fn build_matchups(
        &self,
        priors: &PriorSnapshot,
        planned: Vec<(ValidatedPlayer, Plan)>,
        defects: &mut Vec<RecordDefect>,
    ) -> Vec<Matchup> {
        let env_config = &self.config.environment;
        let mut games: BTreeMap<String, Vec<(ValidatedPlayer, Plan)>> = BTreeMap::new();
        for (player, plan) in planned {
            games.entry(player.matchup_key()).or_default().push((player, plan));
        }

        let mut reported_teams = HashSet::new();
        let mut matchups = Vec::with_capacity(games.len());

        for (key, players) in games {
            let first = &players[0].0;
            let (team_a, team_b) = if first.team <= first.opponent {
                (first.team.clone(), first.opponent.clone())
            } else {
                (first.opponent.clone(), first.team.clone())
            };

            let mut missing_prior = false;
            let mut team_prior = |team: &str| -> TeamPrior {
                match priors.team(team) {
                    Some(prior) => prior.clone(),
                    None => {
                        missing_prior = true;
                        if reported_teams.insert(team.to_string()) {
                            let reporter = players
                                .iter()
                                .map(|(p, _)| p)
                                .find(|p| p.team == team)
                                .unwrap_or(first);
                            defects.push(RecordDefect::new(
                                reporter.record,
                                reporter.player_id.clone(),
                                DefectKind::MissingTeamPrior { team: team.to_string() },
                            ));
                        }
                        TeamPrior::league_average(team)
                    }
                }
            };
            let prior_a = team_prior(&team_a);
            let prior_b = team_prior(&team_b);

            let vegas = players.iter().map(|(p, _)| p).find_map(|p| {
                let total = p.vegas_total?;
                let spread = p.spread.unwrap_or(0.0);
                let spread_a = if p.team == team_a { spread } else { -spread };
                Some(VegasLine { total, spread: spread_a })
            });

            let mut context = GameContext::new(prior_a, prior_b, vegas, env_config);
            if missing_prior {
                context = context.with_widened_shocks(env_config);
            }
            if vegas.is_none() {
                debug!("No Vegas line for {}, widening shocks", key);
            }

            let players = players
                .into_iter()
                .map(|(player, plan)| {
                    let side = context.team_index(&player.team).unwrap_or(1);
                    PlannedPlayer { player, plan, side }
                })
                .collect();
            matchups.push(Matchup { context, players });
        }

        matchups
    }

    /// Environment, usage and outcomes for one game
    fn simulate_matchup(
        &self,
        matchup: &Matchup,
        run: SimulationRun,
    ) -> Vec<(PlannedPlayer, PlayerOutcomeVector)> {
        let config = &self.config;
        let n = run.n_draws;
        let draws = simulate_environment(&matchup.context, run.seed, n, &config.environment);

        // Usage per side, for modeled offensive players only
        let mut usage: Vec<Option<Vec<UsageDraw>>> = vec![None; matchup.players.len()];
        for side in 0..2 {
            let members: Vec<(usize, UsageParticipant<'_>)> = matchup
                .players
                .iter()
                .enumerate()
                .filter(|(_, p)| p.side == side && p.player.position != Position::DST)
                .filter_map(|(i, p)| match &p.plan {
                    Plan::Modeled(prior) => Some((
                        i,
                        UsageParticipant { player_id: &p.player.player_id, usage: &prior.usage },
                    )),
                    Plan::Fallback { .. } => None,
                })
                .collect();

            let participants: Vec<UsageParticipant<'_>> =
                members.iter().map(|(_, p)| *p).collect();
            let series = allocate_team_usage(&participants, run.seed, n, config.usage.max_share);
            for ((index, _), draws) in members.iter().zip(series) {
                usage[*index] = Some(draws);
            }
        }

        let params = ModelParams { scoring: &config.scoring, environment: &config.environment };
        let outcomes: Vec<(PlannedPlayer, PlayerOutcomeVector)> = matchup
            .players
            .iter()
            .zip(usage)
            .map(|(planned, usage)| {
                let own = &draws.draws[planned.side];
                let opponent = &draws.draws[1 - planned.side];
                let player = &planned.player;

                let points = match &planned.plan {
                    Plan::Modeled(prior) => {
                        let mut rng = stream(run.seed, Stage::Outcome, &player.player_id);
                        let usage = usage.unwrap_or_default();
                        simulate_player(
                            model_for(player.position),
                            prior,
                            own,
                            opponent,
                            &usage,
                            &params,
                            &mut rng,
                        )
                    }
                    Plan::Fallback { site_projection } => {
                        let mut rng = stream(run.seed, Stage::Fallback, &player.player_id);
                        let sigma = config.fallback.base_cv.get(player.position)
                            * config.fallback.widening.get(player.position);
                        simulate_fallback(*site_projection, sigma, own, &mut rng)
                    }
                };

                let vector = PlayerOutcomeVector { player_id: player.player_id.clone(), points };
                (planned.clone(), vector)
            })
            .collect();

        debug!("Simulated {} players for {}", outcomes.len(), matchup.context.key);
        outcomes
    }

    fn summarize_player(
        &self,
        priors: &PriorSnapshot,
        planned: &PlannedPlayer,
        outcomes: &PlayerOutcomeVector,
    ) -> Result<PlayerSummary, SimError> {
        let player = &planned.player;
        let options = SummaryOptions {
            boom_threshold: priors.boom_threshold(player.position),
            site_projection: player.site_projection,
            rookie_fallback: matches!(planned.plan, Plan::Fallback { .. }),
            min_stable_draws: self.config.run.min_stable_draws,
        };
        summarize(&player.player_id, player.position, &outcomes.points, options)
    }
}
