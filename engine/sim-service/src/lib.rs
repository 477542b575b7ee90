//! DFS Sim runner
//!
//! Wires the prior store, simulation engine and projection metrics into a
//! single command: load priors and a slate, simulate, print the report.

pub mod config;
pub mod logging;
pub mod runner;

pub use config::{load_config, save_config, validate_config, LoggingConfig, ServiceConfig};
pub use logging::initialize_logging;
pub use runner::{load_priors, load_slate, run_slate, write_report};
