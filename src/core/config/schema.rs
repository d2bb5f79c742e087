//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing: limits must be non-zero so a
//! decoder can always make progress on well-formed input, and the recursion
//! limit may not exceed [`MAX_RECURSION_LIMIT`].

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Recursion limit used when none is configured (protobuf runtime default).
pub const DEFAULT_RECURSION_LIMIT: u32 = 100;

/// Largest recursion limit a configuration may set.
pub const MAX_RECURSION_LIMIT: u32 = 10_000;

/// Codec configuration.
///
/// # Example
///
/// ```toml
/// [decode]
/// max_input_len = 1048576
/// recursion_limit = 32
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Limits applied while decoding
    pub decode: DecodeLimits,
}

impl CodecConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.decode.validate()
    }
}

/// Bounds on what a single decode call will accept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeLimits {
    /// Largest input accepted, in bytes (unlimited when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_input_len: Option<usize>,

    /// Maximum nesting of embedded messages and groups
    pub recursion_limit: u32,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_input_len: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl DecodeLimits {
    /// Set the largest accepted input.
    pub fn with_max_input_len(mut self, len: usize) -> Self {
        self.max_input_len = Some(len);
        self
    }

    /// Set the nesting limit.
    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Validate the limits.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a limit is zero or the
    /// recursion limit is above [`MAX_RECURSION_LIMIT`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recursion_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "decode.recursion_limit must be greater than 0".to_string(),
            ));
        }

        if self.recursion_limit > MAX_RECURSION_LIMIT {
            return Err(ConfigError::InvalidValue(format!(
                "decode.recursion_limit must be at most {}",
                MAX_RECURSION_LIMIT
            )));
        }

        if self.max_input_len == Some(0) {
            return Err(ConfigError::InvalidValue(
                "decode.max_input_len must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let limits = DecodeLimits::default();
        assert_eq!(limits.max_input_len, None);
        assert_eq!(limits.recursion_limit, DEFAULT_RECURSION_LIMIT);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn builder_methods() {
        let limits = DecodeLimits::default()
            .with_max_input_len(64)
            .with_recursion_limit(4);
        assert_eq!(limits.max_input_len, Some(64));
        assert_eq!(limits.recursion_limit, 4);
    }

    #[test]
    fn zero_recursion_limit_invalid() {
        let limits = DecodeLimits::default().with_recursion_limit(0);
        assert!(matches!(
            limits.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn recursion_limit_capped() {
        let at_cap = DecodeLimits::default().with_recursion_limit(MAX_RECURSION_LIMIT);
        assert!(at_cap.validate().is_ok());

        let above = DecodeLimits::default().with_recursion_limit(u32::MAX);
        assert!(matches!(
            above.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn zero_input_len_invalid() {
        let config = CodecConfig {
            decode: DecodeLimits::default().with_max_input_len(0),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_partial_table_keeps_defaults() {
        let config: CodecConfig = toml::from_str("[decode]\nmax_input_len = 10\n").unwrap();
        assert_eq!(config.decode.max_input_len, Some(10));
        assert_eq!(config.decode.recursion_limit, DEFAULT_RECURSION_LIMIT);
    }

    #[test]
    fn toml_unknown_key_rejected() {
        let result: Result<CodecConfig, _> = toml::from_str("[decode]\nmax_depth = 3\n");
        assert!(result.is_err());
    }
}
