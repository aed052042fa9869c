//! # Engine Configuration
//!
//! Loaded once at startup from a TOML file. Every field has a default, so an
//! empty file (or no file at all) is a valid configuration.
//!
//! ```toml
//! [ecs]
//! max_entities = 5000
//!
//! [simulation]
//! fixed_timestep = 0.016666668
//! frames = 600
//! log_interval = 60
//! log_filter = "info"
//!
//! [physics]
//! gravity = [0.0, -9.81, 0.0]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Vec3;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed but is out of its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// ECS sizing.
    pub ecs: EcsConfig,
    /// Frame driver settings.
    pub simulation: SimulationConfig,
    /// Physics constants.
    pub physics: PhysicsConfig,
}

/// ECS sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EcsConfig {
    /// Maximum number of live entities.
    pub max_entities: usize,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            max_entities: kestrel_core::MAX_ENTITIES,
        }
    }
}

/// Frame driver settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seconds advanced per frame.
    pub fixed_timestep: f64,
    /// Frames to run before stopping.
    pub frames: u64,
    /// Physics updates between position log lines; 0 turns them off.
    pub log_interval: u64,
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub log_filter: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            frames: 600,
            log_interval: 60,
            log_filter: "info".to_owned(),
        }
    }
}

/// Physics constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    /// Gravity acceleration.
    pub gravity: Vec3,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

impl EngineConfig {
    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`], [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Serialize`] if rendering fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ecs.max_entities == 0 || u32::try_from(self.ecs.max_entities).is_err() {
            return Err(ConfigError::Invalid(format!(
                "ecs.max_entities must be in 1..={}, got {}",
                u32::MAX,
                self.ecs.max_entities
            )));
        }
        if !(self.simulation.fixed_timestep.is_finite() && self.simulation.fixed_timestep > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "simulation.fixed_timestep must be positive, got {}",
                self.simulation.fixed_timestep
            )));
        }
        let g = self.physics.gravity;
        if !(g.x.is_finite() && g.y.is_finite() && g.z.is_finite()) {
            return Err(ConfigError::Invalid(
                "physics.gravity must be finite".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.ecs.max_entities, 5000);
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            r#"
            [ecs]
            max_entities = 64

            [physics]
            gravity = [0.0, -1.62, 0.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.ecs.max_entities, 64);
        assert_eq!(config.physics.gravity, Vec3::new(0.0, -1.62, 0.0));
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn test_invalid_values() {
        let err = EngineConfig::from_toml_str("[ecs]\nmax_entities = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = EngineConfig::from_toml_str("[simulation]\nfixed_timestep = -0.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_log_interval_disables_logs() {
        let config = EngineConfig::from_toml_str("[simulation]\nlog_interval = 0").unwrap();
        assert_eq!(config.simulation.log_interval, 0);
        assert_eq!(config.simulation.frames, 600);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = EngineConfig::from_toml_str("[ecs]\nmax_entites = 10").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rendered_config_parses_back() {
        let mut config = EngineConfig::default();
        config.ecs.max_entities = 128;
        config.simulation.log_filter = "kestrel=debug".to_owned();

        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
