//! Sim Engine - seeded Monte Carlo simulation of NFL DFS outcomes
//!
//! Turns team and player priors plus a slate into correlated outcome
//! distributions. Matchups are simulated independently on a rayon pool and
//! every random stream is keyed by a stable id, so a run is bit-identical for
//! any thread count.
//!
//! Pipeline per matchup: environment draws ([`environment`]) -> usage
//! allocation ([`usage`]) -> position models ([`outcome`]) -> summaries
//! ([`summary`]).

pub mod cache;
pub mod config;
pub mod environment;
pub mod error;
pub mod outcome;
pub mod run;
pub mod sampling;
pub mod scoring;
pub mod seeding;
pub mod slate;
pub mod stats;
pub mod summary;
pub mod usage;


pub use cache::{inputs_hash, CacheStats, RunCache, RunKey};
pub use config::{
    CacheConfig, EngineConfig, EnvironmentConfig, FallbackConfig, PositionFactors, RunConfig,
    UsageConfig,
};
pub use environment::{simulate_environment, GameContext, MatchupDraws, TeamDraw, VegasLine};
pub use error::SimError;
pub use outcome::{model_for, OutcomeModel, PlayerOutcomeVector};
pub use run::{RunOutput, SimulatedPlayer, SimulationEngine, SimulationRun};
pub use scoring::{ScoringRules, StatLine};
pub use slate::{validate_slate, DefectKind, RecordDefect, SlatePlayer, ValidatedPlayer};
pub use stats::RunStats;
pub use summary::{percentile, summarize, Percentiles, PlayerSummary, SummaryOptions};
pub use usage::UsageDraw;

/// Default draws per player
pub const DEFAULT_N_DRAWS: usize = 10_000;

/// Default run seed
pub const DEFAULT_SEED: u64 = 42;

/// Fewest draws for which percentiles are reported
pub const DEFAULT_MIN_STABLE_DRAWS: usize = 1_000;
