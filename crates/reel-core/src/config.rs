//! Reel Configuration Management
//!
//! Handles configuration from environment variables and config files
//! with sensible defaults for development. Configuration only reaches
//! the I/O collaborators (corpus loading, logging); the matching core
//! takes none.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Title corpus configuration
    pub corpus: CorpusConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError { path, message },
            other => other,
        })
    }

    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    /// Overwrite every field whose variable is set, whatever its value
    fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Corpus
        if let Some(path) = var("REEL_CORPUS_PATH") {
            self.corpus.path = Some(PathBuf::from(path));
        }
        if let Some(rating) = var("REEL_MIN_RATING") {
            self.corpus.min_rating = rating.parse().map_err(|_| ConfigError::InvalidValue {
                key: "REEL_MIN_RATING".to_string(),
                value: rating,
            })?;
        }

        // Logging
        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = var("LOG_JSON") {
            self.logging.json_format = parse_bool("LOG_JSON", &json)?;
        }

        Ok(())
    }

    /// Corpus path, or an error naming the missing key
    pub fn corpus_path(&self) -> Result<&PathBuf, ConfigError> {
        self.corpus
            .path
            .as_ref()
            .ok_or_else(|| ConfigError::MissingRequired("corpus.path".to_string()))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Title corpus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Path to the TSV title corpus (`title<TAB>id[<TAB>rating]`)
    pub path: Option<PathBuf>,

    /// Titles must be rated strictly above this value to be kept
    pub min_rating: f32,

    /// Skip the first row of the corpus file
    pub has_header: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: None,
            // Unrated titles pollute matching with films of limited diffusion
            min_rating: 0.0,
            has_header: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

impl From<ConfigError> for crate::ReelError {
    fn from(err: ConfigError) -> Self {
        crate::ReelError::ConfigError(err.to_string())
    }
}
