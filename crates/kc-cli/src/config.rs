//! CLI configuration.
//!
//! Stored as TOML. The `[pairwise]` and `[logging]` sections are the
//! shared [`kc_core::Config`]; `output_format` belongs to the CLI alone.

use std::path::{Path, PathBuf};

use kc_core::Config;
use kc_crypto::HmacAlgorithm;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Output format.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Shared settings.
    #[serde(flatten)]
    pub settings: Config,
}

impl CliConfig {
    /// Loads configuration from `path`, or from the default path.
    ///
    /// A missing file yields the defaults.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let path = Self::resolve_path(path)?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a TOML document.
    ///
    /// ## Errors
    ///
    /// Returns an error on a syntax error or an invalid value.
    pub fn from_toml_str(content: &str) -> CliResult<Self> {
        #[derive(Deserialize)]
        struct CliSection {
            #[serde(default)]
            output_format: OutputFormat,
        }

        let settings = Config::from_toml_str(content)?;
        let cli: CliSection = toml::from_str(content)
            .map_err(|e| CliError::Config(format!("failed to parse config: {e}")))?;
        Ok(Self {
            output_format: cli.output_format,
            settings,
        })
    }

    /// Saves configuration to `path`, or to the default path.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: Option<&Path>) -> CliResult<()> {
        let path = Self::resolve_path(path)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Gets the default configuration file path.
    ///
    /// ## Errors
    ///
    /// Returns an error if the home directory is unknown.
    pub fn config_path() -> CliResult<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".keycloak").join("kc-pairwise.toml"))
    }

    /// Returns `path` or the default path.
    ///
    /// ## Errors
    ///
    /// See [`Self::config_path`].
    pub fn resolve_path(path: Option<&Path>) -> CliResult<PathBuf> {
        path.map_or_else(Self::config_path, |p| Ok(p.to_path_buf()))
    }

    /// Sets a value by dotted key and validates the result.
    ///
    /// ## Errors
    ///
    /// Returns [`CliError::InvalidArgument`] for an unknown key or a value
    /// that does not parse, and the validation error otherwise.
    pub fn set(&mut self, key: &str, value: &str) -> CliResult<()> {
        match key {
            "output_format" | "output" => {
                self.output_format = OutputFormat::parse(value).ok_or_else(|| {
                    CliError::InvalidArgument(format!(
                        "unknown output format: {value}. Supported: table, json, quiet"
                    ))
                })?;
            }
            "pairwise.default_algorithm" | "algorithm" => {
                self.settings.pairwise.default_algorithm = HmacAlgorithm::from_name(value)
                    .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
            }
            "pairwise.salt_length" => {
                self.settings.pairwise.salt_length = value.parse().map_err(|_| {
                    CliError::InvalidArgument(format!("salt length must be a number: {value}"))
                })?;
            }
            "logging.level" => value.clone_into(&mut self.settings.logging.level),
            "logging.ansi" => {
                self.settings.logging.ansi = value.parse().map_err(|_| {
                    CliError::InvalidArgument(format!("logging.ansi must be true or false: {value}"))
                })?;
            }
            _ => {
                return Err(CliError::InvalidArgument(format!(
                    "unknown configuration key: {key}. Known keys: output_format, \
                     pairwise.default_algorithm, pairwise.salt_length, logging.level, logging.ansi"
                )));
            }
        }

        self.settings.validate()?;
        Ok(())
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Quiet (bare values only).
    Quiet,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "table" => Some(Self::Table),
            "json" => Some(Self::Json),
            "quiet" => Some(Self::Quiet),
            _ => None,
        }
    }
}
