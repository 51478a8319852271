//! Configuration management for typeweave.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `typeweave.toml` file
//! 3. User config `~/.config/typeweave/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod defaults;

pub use defaults::*;

use crate::cross_repo::SimilarityWeights;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extraction configuration.
    pub extraction: ExtractionConfig,

    /// Cross-repo matching configuration.
    pub matching: MatchingConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./typeweave.toml` (project local)
    /// 2. `~/.config/typeweave/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(PROJECT_CONFIG_FILE).exists() {
            return Self::from_file(PROJECT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("TYPEWEAVE_INCLUDE_PRIVATE") {
            if let Ok(b) = value.parse() {
                self.extraction.include_private = b;
            }
        }
        if let Ok(size) = std::env::var("TYPEWEAVE_MAX_FILE_SIZE") {
            if let Ok(n) = size.parse() {
                self.extraction.max_file_size = n;
            }
        }
        if let Ok(value) = std::env::var("TYPEWEAVE_MIN_SIMILARITY") {
            if let Ok(n) = value.parse() {
                self.matching.min_similarity = n;
            }
        }
        if let Ok(value) = std::env::var("TYPEWEAVE_HIGH_CONFIDENCE") {
            if let Ok(n) = value.parse() {
                self.matching.high_confidence = n;
            }
        }
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let matching = &self.matching;
        if matching.weights.total() > 100 {
            return Err(ConfigError::Invalid(format!(
                "similarity weights sum to {}, must be at most 100",
                matching.weights.total()
            )));
        }
        if matching.min_similarity > 100 || matching.high_confidence > 100 {
            return Err(ConfigError::Invalid(
                "similarity thresholds must be at most 100".to_string(),
            ));
        }
        if matching.min_similarity > matching.high_confidence {
            return Err(ConfigError::Invalid(format!(
                "min_similarity ({}) exceeds high_confidence ({})",
                matching.min_similarity, matching.high_confidence
            )));
        }
        if self.extraction.max_file_size == 0 {
            return Err(ConfigError::Invalid(
                "max_file_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extract non-public declarations too.
    pub include_private: bool,

    /// Maximum size of a single file to parse (in bytes).
    pub max_file_size: u64,

    /// Directories to exclude when walking a repository.
    pub exclude_dirs: Vec<String>,

    /// Run zod and ORM schema parsers alongside the primary parsers.
    pub supplementary: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            include_private: DEFAULT_INCLUDE_PRIVATE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            supplementary: DEFAULT_SUPPLEMENTARY,
        }
    }
}

/// Cross-repo matching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum similarity for a match to produce flow edges.
    pub min_similarity: u8,

    /// Similarity at or above which a flow is high confidence.
    pub high_confidence: u8,

    /// Similarity scoring weights.
    pub weights: SimilarityWeights,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            high_confidence: DEFAULT_HIGH_CONFIDENCE,
            weights: SimilarityWeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.extraction.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert!(!config.extraction.include_private);
        assert_eq!(config.matching.weights.total(), 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_to_toml() {
        let toml_str = Config::default_config_string();
        assert!(toml_str.contains("[extraction]"));
        assert!(toml_str.contains("[matching.weights]"));
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = Config::default();
        config.matching.min_similarity = 90;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
