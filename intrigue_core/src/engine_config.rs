//! Tuning values for the state engine.
//!
//! Loaded from `engine_config.json` with an environment variable override.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use bevy::prelude::Resource;
use serde::Deserialize;
use thiserror::Error;

pub const BUILTIN_ENGINE_CONFIG: &str = include_str!("data/engine_config.json");
pub const ENGINE_CONFIG_ENV_VAR: &str = "INTRIGUE_ENGINE_CONFIG_PATH";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    attributes: AttributeConfig,
    opinion: OpinionConfig,
    conditions: ConditionConfig,
    rng: RngConfig,
}

impl EngineConfig {
    pub fn builtin() -> Arc<Self> {
        match Self::from_json_str(BUILTIN_ENGINE_CONFIG) {
            Ok(config) => Arc::new(config),
            Err(err) => {
                tracing::warn!(
                    target: "intrigue::config",
                    error = %err,
                    "engine_config.builtin_invalid"
                );
                Arc::new(Self::default())
            }
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, EngineConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, EngineConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| EngineConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    fn validate(&self) -> Result<(), EngineConfigError> {
        let [a, b, c] = self.opinion.tier_thresholds;
        if !(a <= b && b <= c && c <= 100) {
            return Err(EngineConfigError::Thresholds([a, b, c]));
        }
        if self.attributes.min > self.attributes.max {
            return Err(EngineConfigError::Bounds {
                min: self.attributes.min,
                max: self.attributes.max,
            });
        }
        Ok(())
    }

    pub fn attributes(&self) -> &AttributeConfig {
        &self.attributes
    }

    pub fn opinion(&self) -> &OpinionConfig {
        &self.opinion
    }

    pub fn opinion_mut(&mut self) -> &mut OpinionConfig {
        &mut self.opinion
    }

    pub fn conditions(&self) -> &ConditionConfig {
        &self.conditions
    }

    pub fn rng(&self) -> &RngConfig {
        &self.rng
    }
}

/// Clamp bounds and team presence modifiers for node attributes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AttributeConfig {
    pub min: i32,
    pub max: i32,
    pub civil_team_stability: i32,
    pub control_team_security: i32,
    /// Applied negated to support.
    pub media_team_support: i32,
}

impl Default for AttributeConfig {
    fn default() -> Self {
        Self {
            min: 0,
            max: 3,
            civil_team_stability: 1,
            control_team_security: 1,
            media_team_support: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpinionConfig {
    /// Percent chance of negating a contrary change for compatibility tiers
    /// one, two and three.
    pub tier_thresholds: [u32; 3],
    pub colours: OpinionColours,
}

impl OpinionConfig {
    pub fn threshold_for(&self, tier: u32) -> Option<u32> {
        match tier {
            1..=3 => self.tier_thresholds.get(tier as usize - 1).copied(),
            _ => None,
        }
    }

    pub fn set_tier_thresholds(&mut self, thresholds: [u32; 3]) {
        self.tier_thresholds = thresholds;
    }
}

impl Default for OpinionConfig {
    fn default() -> Self {
        Self {
            tier_thresholds: [20, 40, 60],
            colours: OpinionColours::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpinionColours {
    pub gain: String,
    pub loss: String,
    pub negated: String,
    pub start: String,
}

impl Default for OpinionColours {
    fn default() -> Self {
        Self {
            gain: "#51cf66".to_string(),
            loss: "#ff6b6b".to_string(),
            negated: "#868e96".to_string(),
            start: "#ffd43b".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConditionConfig {
    pub blackmail_timer: i32,
    pub blackmail_long_multiplier: i32,
    pub blackmail_short_divisor: i32,
}

impl Default for ConditionConfig {
    fn default() -> Self {
        Self {
            blackmail_timer: 10,
            blackmail_long_multiplier: 3,
            blackmail_short_divisor: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RngConfig {
    pub seed: u64,
}

impl Default for RngConfig {
    fn default() -> Self {
        Self { seed: 1337 }
    }
}

#[derive(Debug, Error)]
pub enum EngineConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read engine config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("opinion tier thresholds must be ascending percentages, got {0:?}")]
    Thresholds([u32; 3]),
    #[error("attribute bounds are inverted (min {min}, max {max})")]
    Bounds { min: i32, max: i32 },
}

#[derive(Resource, Debug, Clone)]
pub struct EngineConfigHandle(pub Arc<EngineConfig>);

impl EngineConfigHandle {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self(config)
    }

    pub fn get(&self) -> Arc<EngineConfig> {
        Arc::clone(&self.0)
    }

    pub fn replace(&mut self, config: Arc<EngineConfig>) {
        self.0 = config;
    }
}

#[derive(Resource, Debug, Clone)]
pub struct EngineConfigMetadata {
    path: Option<PathBuf>,
}

impl EngineConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Loads the engine config from `INTRIGUE_ENGINE_CONFIG_PATH` or the crate's
/// data directory, falling back to the embedded copy.
pub fn load_engine_config_from_env() -> (Arc<EngineConfig>, EngineConfigMetadata) {
    let override_path = env::var(ENGINE_CONFIG_ENV_VAR).ok().map(PathBuf::from);
    let path = override_path.unwrap_or_else(|| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src/data/engine_config.json")
    });

    match EngineConfig::from_file(&path) {
        Ok(config) => {
            tracing::info!(
                target: "intrigue::config",
                path = %path.display(),
                "engine_config.loaded=file"
            );
            (Arc::new(config), EngineConfigMetadata::new(Some(path)))
        }
        Err(err) => {
            tracing::warn!(
                target: "intrigue::config",
                path = %path.display(),
                error = %err,
                "engine_config.load_failed"
            );
            tracing::info!(target: "intrigue::config", "engine_config.loaded=builtin");
            (EngineConfig::builtin(), EngineConfigMetadata::new(None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_parses() {
        let config = EngineConfig::from_json_str(BUILTIN_ENGINE_CONFIG).expect("builtin parses");
        assert_eq!(config.opinion().tier_thresholds, [20, 40, 60]);
        assert_eq!(config.conditions().blackmail_timer, 10);
        assert_eq!(config.attributes().max, 3);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "rng": { "seed": 9 } }"#).expect("parses");
        assert_eq!(config.rng().seed, 9);
        assert_eq!(config.opinion().threshold_for(2), Some(40));
        assert_eq!(config.conditions().blackmail_long_multiplier, 3);
    }

    #[test]
    fn threshold_lookup_rejects_tier_zero() {
        let config = EngineConfig::default();
        assert_eq!(config.opinion().threshold_for(0), None);
        assert_eq!(config.opinion().threshold_for(3), Some(60));
        assert_eq!(config.opinion().threshold_for(4), None);
    }

    #[test]
    fn descending_thresholds_are_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "opinion": { "tier_thresholds": [50, 40, 60] } }"#)
            .unwrap_err();
        assert!(matches!(err, EngineConfigError::Thresholds([50, 40, 60])));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/engine.json")).unwrap_err();
        assert!(matches!(err, EngineConfigError::Read { .. }));
    }
}
