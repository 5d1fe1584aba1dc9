//! Engine configuration.
//!
//! A `gasket.toml` may set any subset of the fields below; the rest keep
//! their defaults.
//!
//! ```toml
//! max_level = 8
//! max_level_ceiling = 12
//! tolerance = 1e-9
//! validate = true
//! parallelism = 4
//! preset = "enclosed_pair"
//! ```
//!
//! Generators can be given inline instead of a preset:
//!
//! ```toml
//! [[generators]]
//! x = 0.0
//! y = 0.0
//! curvature = -1.0
//! ```

use crate::circle::Circle;
use crate::seed::Preset;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_MAX_LEVEL: u32 = 6;
pub const DEFAULT_MAX_LEVEL_CEILING: u32 = 14;
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GasketConfig {
    pub max_level: u32,
    /// Hard upper bound on `max_level`; work grows as `3^max_level`.
    pub max_level_ceiling: u32,
    /// Relative tangency tolerance for generator validation and audits.
    pub tolerance: f64,
    pub validate: bool,
    /// Worker threads for expansion; 1 is sequential.
    pub parallelism: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generators: Option<Vec<Circle>>,
}

impl Default for GasketConfig {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            max_level_ceiling: DEFAULT_MAX_LEVEL_CEILING,
            tolerance: DEFAULT_TOLERANCE,
            validate: true,
            parallelism: 1,
            preset: None,
            generators: None,
        }
    }
}

impl GasketConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Parse and check a TOML document; `origin` labels errors.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: origin.to_string(),
            source,
        })?;
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be a positive finite number, got {}",
                self.tolerance
            )));
        }
        if self.max_level > self.max_level_ceiling {
            return Err(ConfigError::Invalid(format!(
                "max_level {} exceeds max_level_ceiling {}",
                self.max_level, self.max_level_ceiling
            )));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::Invalid(
                "parallelism must be at least 1".to_string(),
            ));
        }
        if self.preset.is_some() && self.generators.is_some() {
            return Err(ConfigError::Invalid(
                "set either `preset` or `generators`, not both".to_string(),
            ));
        }
        if let Some(generators) = &self.generators
            && generators.len() != 3
        {
            return Err(ConfigError::Invalid(format!(
                "expected exactly 3 generators, got {}",
                generators.len()
            )));
        }
        Ok(())
    }

    /// The generators this configuration names, if any.
    pub fn configured_generators(&self) -> Result<Option<[Circle; 3]>, ConfigError> {
        if let Some(generators) = &self.generators {
            let triple: [Circle; 3] = generators.as_slice().try_into().map_err(|_| {
                ConfigError::Invalid(format!(
                    "expected exactly 3 generators, got {}",
                    generators.len()
                ))
            })?;
            return Ok(Some(triple));
        }
        match self.preset {
            Some(preset) => preset
                .generators()
                .map(Some)
                .map_err(|e| ConfigError::Invalid(e.to_string())),
            None => Ok(None),
        }
    }
}
