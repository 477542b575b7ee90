//! Prior Store - historical baselines for the DFS simulation engine
//!
//! Team priors, player priors and position boom thresholds are built offline
//! and loaded once per simulation run as a read-only [`PriorSnapshot`].

pub mod hashing;
pub mod store;
pub mod types;

pub use hashing::player_key;
pub use store::{
    default_boom_threshold, InMemoryPriorStore, JsonPriorStore, PriorSnapshot, PriorStore,
    PriorStoreError,
};
pub use types::{
    DefensePrior, Dist, EfficiencyPrior, PlayerPrior, Position, TeamPrior, UnknownPosition,
    UsagePrior,
};
