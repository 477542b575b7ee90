//! Runner configuration management
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, `DFS_SIM__*` environment variables (`__` separates nested keys, e.g.
//! `DFS_SIM__ENGINE__RUN__SEED=7`), then command-line flags.

use anyhow::{anyhow, Context, Result};
use projections::ProjectionConfig;
use serde::{Deserialize, Serialize};
use sim_engine::EngineConfig;
use std::path::{Path, PathBuf};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DFS_SIM";

/// Main runner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Simulation engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Boom score and report configuration
    #[serde(default)]
    pub projections: ProjectionConfig,

    /// Input and output locations
    #[serde(default)]
    pub service: ServiceSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input and output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Directory holding `team_priors.json`, `player_priors.json` and
    /// `boom_thresholds.json`
    pub priors_dir: PathBuf,

    /// Slate JSON (array of slate players)
    pub slate_path: PathBuf,

    /// Report destination; stdout when unset
    pub output_path: Option<PathBuf>,

    /// Pretty-print the report
    pub pretty: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            priors_dir: PathBuf::from("./data/priors"),
            slate_path: PathBuf::from("./data/slate.json"),
            output_path: None,
            pretty: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "compact".to_string() }
    }
}

/// Load configuration from an optional file and the environment
pub fn load_config(config_file: Option<&Path>) -> Result<ServiceConfig> {
    let mut builder = config::Config::builder();

    if let Some(path) = config_file {
        if !path.exists() {
            return Err(anyhow!("Configuration file not found: {}", path.display()));
        }
        builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
    }

    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true),
    );

    let config = builder
        .build()
        .context("Failed to read configuration sources")?
        .try_deserialize::<ServiceConfig>()
        .context("Failed to parse configuration")?;

    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.logging.level)),
    }

    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow!("Invalid log format: {}", config.logging.format)),
    }

    config.engine.validate().context("Invalid engine configuration")?;
    config.projections.validate().context("Invalid projection configuration")?;

    Ok(())
}

/// Save configuration to a TOML file
pub fn save_config(config: &ServiceConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write configuration: {}", path.display()))?;
    Ok(())
}
