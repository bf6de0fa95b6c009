//! Engine configuration, loaded from a RON file next to the catalog data.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which rule turns an ability's affinity into a damage multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AffinityRule {
    /// 1.5x if the target lists the affinity as a weakness, 0.5x if as a resistance.
    #[default]
    MonsterLists,
    /// 2.0x / 0.5x from the fixed elemental chart against the target's own affinity.
    TypeChart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub affinity_rule: AffinityRule,
    /// Seeds every new session's rng. `None` draws from the OS.
    pub rng_seed: Option<u64>,
    pub data_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            affinity_rule: AffinityRule::default(),
            rng_seed: None,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "no engine config found, using defaults");
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = EngineConfig::from_ron("(affinity_rule: TypeChart)").unwrap();
        assert_eq!(config.affinity_rule, AffinityRule::TypeChart);
        assert_eq!(config.rng_seed, None);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_bundled_config_loads() {
        let config = EngineConfig::load_or_default(Path::new("data/engine.ron")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_malformed_config_is_rejected() {
        assert!(EngineConfig::from_ron("(affinity_rule: Sideways)").is_err());
    }
}
