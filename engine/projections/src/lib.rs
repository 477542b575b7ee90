//! Projections - decision metrics derived from a simulation run
//!
//! Everything here is pool-relative: a [`PoolContext`] holds every simulated
//! player of one slate, and boom scores, value leaderboards and diagnostics
//! are computed against it. [`build_report`] assembles the full
//! [`SlateReport`] for a [`sim_engine::RunOutput`].

pub mod boom;
pub mod compare;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod flags;
pub mod pool;
pub mod report;
pub mod value;

pub use boom::{mid_rank, BoomCalculator, BoomScore};
pub use compare::ComparisonRecord;
pub use config::{BoomConfig, FlagConfig, OwnershipTier, ProjectionConfig};
pub use diagnostics::{AccuracyMetrics, Diagnostics, DiagnosticsEngine};
pub use error::ProjectionError;
pub use flags::NotableFlags;
pub use pool::{PoolContext, PoolEntry};
pub use report::{build_report, PlayerReport, RunMetadata, SlateReport};
pub use value::{ValueCalculator, ValueMetrics};
