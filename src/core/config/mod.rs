//! core::config
//!
//! Codec configuration schema and loading.
//!
//! # Overview
//!
//! The codec has a single configuration surface, the decode limits that
//! bound how much work one call may do on untrusted input. Configuration is
//! plain TOML; callers decide where the file lives, and keys missing from
//! the file keep their defaults.
//!
//! # Example
//!
//! ```no_run
//! use dir_metadata::core::config::CodecConfig;
//! use std::path::Path;
//!
//! let config = CodecConfig::load(Path::new("codec.toml")).unwrap();
//! println!("Recursion limit: {}", config.decode.recursion_limit);
//! ```

pub mod schema;

pub use schema::{CodecConfig, DecodeLimits, DEFAULT_RECURSION_LIMIT, MAX_RECURSION_LIMIT};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to parse config: {0}")]
    InvalidToml(String),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

impl CodecConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML for
    /// this schema, or holds invalid values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: CodecConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "loaded codec config");
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid TOML for this schema or
    /// holds invalid values.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: CodecConfig =
            toml::from_str(contents).map_err(|e| ConfigError::InvalidToml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}
