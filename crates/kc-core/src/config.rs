//! Configuration for the pairwise mapper extensions.
//!
//! Loaded from TOML. Every section has defaults, so an empty document is a
//! valid configuration.

use kc_crypto::{DEFAULT_SALT_BYTES, HmacAlgorithm, MIN_SALT_BYTES};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Top-level extension configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Pairwise mapper defaults.
    #[serde(default)]
    pub pairwise: PairwiseSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parses and validates a TOML document.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::Config`] on a syntax error or unknown algorithm name,
    /// and [`Error::Validation`] if a value is out of range.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    ///
    /// ## Errors
    ///
    /// Returns the first section error.
    pub fn validate(&self) -> Result<()> {
        self.pairwise.validate()?;
        self.logging.validate()
    }
}

/// Defaults applied when an administrator saves a pairwise mapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseSettings {
    /// Algorithm written into configurations that do not name one.
    #[serde(default)]
    pub default_algorithm: HmacAlgorithm,

    /// Length in bytes of generated salts.
    #[serde(default = "default_salt_length")]
    pub salt_length: usize,
}

const fn default_salt_length() -> usize {
    DEFAULT_SALT_BYTES
}

impl Default for PairwiseSettings {
    fn default() -> Self {
        Self {
            default_algorithm: HmacAlgorithm::DEFAULT,
            salt_length: default_salt_length(),
        }
    }
}

impl PairwiseSettings {
    /// Validates the settings.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::Validation`] if the salt is shorter than
    /// [`MIN_SALT_BYTES`].
    pub fn validate(&self) -> Result<()> {
        if self.salt_length < MIN_SALT_BYTES {
            return Err(Error::Validation(format!(
                "pairwise.salt_length must be at least {MIN_SALT_BYTES} bytes, got {}",
                self.salt_length
            )));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `kc_protocol_oidc=debug`.
    #[serde(default = "default_level")]
    pub level: String,

    /// Whether to emit ANSI colors.
    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

fn default_level() -> String {
    "info".to_string()
}

const fn default_ansi() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            ansi: default_ansi(),
        }
    }
}

impl LoggingConfig {
    /// Builds the subscriber filter for this configuration.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::Config`] if the directive does not parse.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.level)
            .map_err(|e| Error::Config(format!("invalid logging.level '{}': {e}", self.level)))
    }

    /// Validates the filter directive.
    ///
    /// ## Errors
    ///
    /// See [`Self::env_filter`].
    pub fn validate(&self) -> Result<()> {
        self.env_filter().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.pairwise.default_algorithm, HmacAlgorithm::Sha256);
        assert_eq!(config.pairwise.salt_length, DEFAULT_SALT_BYTES);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn sections_are_parsed() {
        let config = Config::from_toml_str(
            r#"
            [pairwise]
            default_algorithm = "HmacSHA3-512"
            salt_length = 32

            [logging]
            level = "kc_protocol_oidc=debug"
            ansi = false
            "#,
        )
        .unwrap();

        assert_eq!(config.pairwise.default_algorithm, HmacAlgorithm::Sha3_512);
        assert_eq!(config.pairwise.salt_length, 32);
        assert!(!config.logging.ansi);
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let result = Config::from_toml_str(
            r#"
            [pairwise]
            default_algorithm = "HmacWhirlpool"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn short_salt_is_rejected() {
        let result = Config::from_toml_str(
            r"
            [pairwise]
            salt_length = 8
            ",
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn default_algorithm_is_not_legacy() {
        assert!(!PairwiseSettings::default().default_algorithm.is_legacy());
    }
}
