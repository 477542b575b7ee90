//! Error types for projection metrics

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot build a report for an empty player pool")]
    EmptyPool,

    #[error("Pool and metrics disagree for player {player_id}")]
    Misaligned { player_id: String },
}
