//! Histogram bucket configuration.
//!
//! Metric declarations name bucket presets (`memory`, `network`); this
//! configuration supplies the boundaries behind them. Every preset has a built-in
//! default and may be overridden from a TOML, YAML or JSON document:
//!
//! ```toml
//! [presets]
//! network = [0.001, 0.01, 0.1, 1.0]
//! ```

use producer_metrics_core::{BucketPreset, BucketSpec};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors raised while loading bucket configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {message}")]
    FileRead { path: String, message: String },

    #[error("Failed to parse configuration: {message}")]
    Parse { message: String },

    #[error("Preset '{preset}' has invalid buckets: {message}")]
    InvalidBuckets { preset: String, message: String },
}

/// Boundaries for each named preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetBuckets {
    /// Byte sizes
    pub memory: Vec<f64>,

    /// Latencies, in seconds
    pub network: Vec<f64>,
}

impl Default for PresetBuckets {
    fn default() -> Self {
        Self {
            memory: BucketPreset::Memory.default_boundaries(),
            network: BucketPreset::Network.default_boundaries(),
        }
    }
}

/// Bucket configuration for the Prometheus sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BucketConfig {
    pub presets: PresetBuckets,
}

impl BucketConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: BucketConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            message: format!("Invalid TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path
    ///
    /// The format follows the extension: `.toml`, `.yaml`/`.yml` or `.json`.
    /// Files without a recognized extension are parsed as TOML.
    ///
    /// # Errors
    /// - `ConfigError::FileRead` - the file cannot be read
    /// - `ConfigError::Parse` - invalid syntax for the detected format
    /// - `ConfigError::InvalidBuckets` - a preset fails validation
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config: BucketConfig = match extension.to_lowercase().as_str() {
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
                    message: format!("Invalid YAML: {}", e),
                })?
            }
            "json" => serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                message: format!("Invalid JSON: {}", e),
            })?,
            _ => return Self::from_toml_str(&contents),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that every preset is non-empty, finite and strictly increasing
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_buckets(BucketPreset::Memory, &self.presets.memory)?;
        validate_buckets(BucketPreset::Network, &self.presets.network)
    }

    /// Boundaries configured for a preset
    pub fn preset(&self, preset: BucketPreset) -> &[f64] {
        match preset {
            BucketPreset::Memory => &self.presets.memory,
            BucketPreset::Network => &self.presets.network,
        }
    }

    /// Resolve a declaration's bucket spec to concrete boundaries
    pub fn resolve(&self, spec: &BucketSpec) -> Vec<f64> {
        match spec {
            BucketSpec::Preset(preset) => self.preset(*preset).to_vec(),
            BucketSpec::Explicit(bounds) => bounds.to_vec(),
        }
    }
}

fn validate_buckets(preset: BucketPreset, bounds: &[f64]) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidBuckets {
        preset: preset.to_string(),
        message: message.to_string(),
    };

    if bounds.is_empty() {
        return Err(invalid("at least one boundary is required"));
    }
    if bounds.iter().any(|b| !b.is_finite()) {
        return Err(invalid("boundaries must be finite"));
    }
    if bounds.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(invalid("boundaries must be strictly increasing"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
