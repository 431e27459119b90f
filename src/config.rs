//! Configuration for generation runs.
//!
//! Configuration is layered: built-in defaults, then an optional YAML file,
//! then environment variables, then CLI flags. Each layer only overrides the
//! values it sets.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompts::PromptTemplate;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// The configuration file could not be parsed.
    #[error("Failed to parse config file '{path}': {message}")]
    ParseFailed { path: String, message: String },

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Knobs for the generation pipeline itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Target chunk size in characters (QA generation splits documents).
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub overlap: usize,
    /// Number of prompts submitted to the backend per batch.
    pub batch_size: usize,
    /// Sampling temperature for all completion requests.
    pub temperature: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4000,
            overlap: 200,
            batch_size: 32,
            temperature: 0.7,
        }
    }
}

/// Connection settings for the completion backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API (e.g. "http://localhost:8000/v1").
    pub api_base: Option<String>,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Model identifier sent with every request.
    pub model: Option<String>,
}

/// Top-level configuration: generation knobs, backend connection, and
/// per-content-type prompt template overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub generation: GenerationConfig,
    pub llm: LlmConfig,
    /// Prompt templates keyed by prompt name (e.g. "qa_generation").
    /// Names absent here fall back to the built-in defaults.
    pub prompts: BTreeMap<String, PromptTemplate>,
}

impl SynthConfig {
    /// Load configuration from a YAML file, or defaults when `path` is None.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_yaml::from_str(&raw).map_err(|e| ConfigError::ParseFailed {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Apply environment-variable overrides.
    ///
    /// # Environment Variables
    ///
    /// - `SYNTHKIT_CHUNK_SIZE`: chunk size in characters (default: 4000)
    /// - `SYNTHKIT_CHUNK_OVERLAP`: chunk overlap in characters (default: 200)
    /// - `SYNTHKIT_BATCH_SIZE`: prompts per batch (default: 32)
    /// - `SYNTHKIT_TEMPERATURE`: sampling temperature (default: 0.7)
    /// - `SYNTHKIT_API_BASE`: completion API base URL
    /// - `SYNTHKIT_API_KEY`: bearer token for the API
    /// - `SYNTHKIT_MODEL`: model identifier
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("SYNTHKIT_CHUNK_SIZE") {
            self.generation.chunk_size = parse_env_value(&val, "SYNTHKIT_CHUNK_SIZE")?;
        }
        if let Ok(val) = std::env::var("SYNTHKIT_CHUNK_OVERLAP") {
            self.generation.overlap = parse_env_value(&val, "SYNTHKIT_CHUNK_OVERLAP")?;
        }
        if let Ok(val) = std::env::var("SYNTHKIT_BATCH_SIZE") {
            self.generation.batch_size = parse_env_value(&val, "SYNTHKIT_BATCH_SIZE")?;
        }
        if let Ok(val) = std::env::var("SYNTHKIT_TEMPERATURE") {
            self.generation.temperature = parse_env_value(&val, "SYNTHKIT_TEMPERATURE")?;
        }
        if let Ok(val) = std::env::var("SYNTHKIT_API_BASE") {
            self.llm.api_base = Some(val);
        }
        if let Ok(val) = std::env::var("SYNTHKIT_API_KEY") {
            self.llm.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("SYNTHKIT_MODEL") {
            self.llm.model = Some(val);
        }
        Ok(())
    }

    /// Validate the configuration, failing fast on values that would make the
    /// pipeline loop or divide by zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.chunk_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.generation.overlap >= self.generation.chunk_size {
            return Err(ConfigError::ValidationFailed(format!(
                "overlap ({}) must be less than chunk_size ({})",
                self.generation.overlap, self.generation.chunk_size
            )));
        }
        if self.generation.batch_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::ValidationFailed(format!(
                "temperature ({}) must be in [0.0, 2.0]",
                self.generation.temperature
            )));
        }
        Ok(())
    }

    /// Look up the prompt template for `name`, preferring a file override and
    /// falling back to the built-in defaults.
    pub fn prompt(&self, name: &str) -> Option<PromptTemplate> {
        self.prompts
            .get(name)
            .cloned()
            .or_else(|| crate::prompts::default_prompt(name))
    }
}

fn parse_env_value<T: std::str::FromStr>(val: &str, key: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    val.parse().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SynthConfig::default();
        assert_eq!(config.generation.chunk_size, 4000);
        assert_eq!(config.generation.overlap, 200);
        assert_eq!(config.generation.batch_size, 32);
        assert!((config.generation.temperature - 0.7).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overlap_at_least_chunk_size() {
        let mut config = SynthConfig::default();
        config.generation.chunk_size = 100;
        config.generation.overlap = 100;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));

        config.generation.overlap = 150;
        assert!(config.validate().is_err());

        config.generation.overlap = 99;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = SynthConfig::default();
        config.generation.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip_with_prompt_override() {
        let yaml = r#"
generation:
  chunk_size: 1000
  overlap: 50
prompts:
  qa_generation:
    system: "custom system"
    user: "custom user {text}"
"#;
        let config: SynthConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.generation.chunk_size, 1000);
        assert_eq!(config.generation.overlap, 50);
        // Unset fields keep their defaults.
        assert_eq!(config.generation.batch_size, 32);

        let prompt = config.prompt("qa_generation").unwrap();
        assert_eq!(prompt.system, "custom system");

        // Non-overridden prompts fall back to the built-ins.
        assert!(config.prompt("distill").is_some());
        assert!(config.prompt("no_such_prompt").is_none());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = SynthConfig::load(Some(Path::new("/nonexistent/synthkit.yaml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
