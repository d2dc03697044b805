//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::OutputFormat;

/// kc-pairwise - Administration tool for the HMAC pairwise pseudonym mappers.
#[derive(Debug, Parser)]
#[command(name = "kc-pairwise")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ~/.keycloak/kc-pairwise.toml).
    #[arg(short, long, env = "KC_PAIRWISE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (overrides config).
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the supported HMAC algorithms.
    Algorithms,

    /// Generate a salt for a salted mapper.
    Salt(SaltArgs),

    /// Compute a pseudonym from explicit inputs.
    Generate(GenerateArgs),

    /// Validate exported mapper configurations.
    Validate(ValidateArgs),

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Salt arguments.
#[derive(Debug, Args)]
pub struct SaltArgs {
    /// Salt length in bytes (defaults to the configured length).
    #[arg(short, long)]
    pub length: Option<usize>,
}

/// Key convention of a pseudonym computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Convention {
    /// The salt keys the MAC; sector and local ID are the message.
    Salted,
    /// The sector keys the MAC; the local ID is the message.
    SectorKeyed,
}

/// Generate arguments.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Key convention.
    #[arg(long, value_enum, default_value = "salted")]
    pub convention: Convention,

    /// HMAC algorithm (defaults to the configured algorithm).
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// Salt, required for the salted convention.
    #[arg(long, env = "KC_PAIRWISE_SALT", hide_env_values = true)]
    pub salt: Option<String>,

    /// Sector identifier.
    #[arg(long)]
    pub sector: String,

    /// Local identifier, usually the user ID.
    #[arg(long)]
    pub local_id: String,
}

/// Validate arguments.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// JSON file with `realm` and `clients` mapper configurations.
    pub file: PathBuf,
}

/// Config commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key, e.g. `pairwise.salt_length`.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Reset the configuration to defaults.
    Reset,

    /// Print the configuration file path.
    Path,
}
