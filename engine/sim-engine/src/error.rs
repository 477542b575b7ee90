//! Error types for the simulation engine

use prior_store::PriorStoreError;
use thiserror::Error;

/// Run-aborting failures. Per-record problems are reported as
/// [`crate::slate::RecordDefect`]s instead.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prior store error: {0}")]
    Priors(#[from] PriorStoreError),

    #[error("Simulation needs at least one draw")]
    ZeroDraws,

    #[error("No valid players in slate ({rejected} records rejected)")]
    NoValidPlayers { rejected: usize },

    #[error("No usable priors: prior store is empty and no player has a site projection")]
    NoUsablePriors,

    #[error("Empty outcome vector for player {player_id}")]
    EmptyOutcomes { player_id: String },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("Failed to hash run inputs: {0}")]
    InputHash(#[from] serde_json::Error),
}
