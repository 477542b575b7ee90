//! Configuration for boom scoring and report flags

use crate::error::ProjectionError;
use serde::{Deserialize, Serialize};

/// Configuration for every projection metric
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionConfig {
    #[serde(default)]
    pub boom: BoomConfig,

    #[serde(default)]
    pub flags: FlagConfig,
}

/// Ownership boost for players owned at or below `max_ownership` percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OwnershipTier {
    pub max_ownership: f64,
    pub boost: f64,
}

/// Boom score parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoomConfig {
    /// Weight of boom probability in the composite
    pub boom_weight: f64,

    /// Weight of beat-site probability in the composite
    pub beat_site_weight: f64,

    /// Boost reached at `value_ceiling_multiple` times the position median
    pub max_value_boost: f64,
    pub value_ceiling_multiple: f64,

    /// Highest ownership (percent) for a dart throw
    pub dart_max_ownership: f64,

    /// Lowest boom score for a dart throw
    pub dart_min_score: f64,

    /// Ascending ownership tiers; the first match wins
    pub ownership_tiers: Vec<OwnershipTier>,
}

impl Default for BoomConfig {
    fn default() -> Self {
        let tier = |max_ownership, boost| OwnershipTier { max_ownership, boost };
        Self {
            boom_weight: 0.6,
            beat_site_weight: 0.4,
            max_value_boost: 0.15,
            value_ceiling_multiple: 2.0,
            dart_max_ownership: 5.0,
            dart_min_score: 70.0,
            ownership_tiers: vec![tier(5.0, 0.20), tier(10.0, 0.10), tier(20.0, 0.05)],
        }
    }
}

/// Notable-player flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagConfig {
    /// Players listed per delta flag
    pub top_n: usize,
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self { top_n: 10 }
    }
}

impl ProjectionConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ProjectionConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ProjectionError> {
        let boom = &self.boom;
        for (name, value) in [
            ("boom_weight", boom.boom_weight),
            ("beat_site_weight", boom.beat_site_weight),
            ("max_value_boost", boom.max_value_boost),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ProjectionError::Config(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if boom.boom_weight + boom.beat_site_weight <= 0.0 {
            return Err(ProjectionError::Config("composite weights sum to zero".to_string()));
        }
        if !(boom.value_ceiling_multiple > 1.0) {
            return Err(ProjectionError::Config(format!(
                "value_ceiling_multiple must exceed 1, got {}",
                boom.value_ceiling_multiple
            )));
        }
        let ascending =
            boom.ownership_tiers.windows(2).all(|w| w[0].max_ownership < w[1].max_ownership);
        if !ascending {
            return Err(ProjectionError::Config(
                "ownership tiers must be sorted by ascending max_ownership".to_string(),
            ));
        }
        if boom.ownership_tiers.iter().any(|t| !(t.boost.is_finite() && t.boost >= 0.0)) {
            return Err(ProjectionError::Config(
                "ownership boosts must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ProjectionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.boom.ownership_tiers.len(), 3);
        assert_eq!(config.flags.top_n, 10);
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = ProjectionConfig::default();
        config.boom.boom_weight = 0.0;
        config.boom.beat_site_weight = 0.0;
        assert!(config.validate().is_err());

        let mut config = ProjectionConfig::default();
        config.boom.value_ceiling_multiple = 1.0;
        assert!(config.validate().is_err());

        let mut config = ProjectionConfig::default();
        config.boom.ownership_tiers.reverse();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projections.toml");
        let path = path.to_str().unwrap();

        let mut config = ProjectionConfig::default();
        config.flags.top_n = 5;
        config.to_file(path).unwrap();

        let loaded = ProjectionConfig::from_file(path).unwrap();
        assert_eq!(loaded.flags.top_n, 5);
        assert_eq!(loaded.boom, BoomConfig::default());
    }
}
