//! Configuration management commands.

use std::path::Path;

use crate::CliConfig;
use crate::cli::ConfigCommand;
use crate::config::OutputFormat;
use crate::output::{info, output_single, success};

/// Runs a config command against the file at `path`, or the default path.
///
/// ## Errors
///
/// Returns an error for an invalid key or value, or if the file cannot be
/// written.
pub fn run_config(
    cmd: ConfigCommand,
    config: &mut CliConfig,
    path: Option<&Path>,
    format: OutputFormat,
) -> crate::CliResult<()> {
    match cmd {
        ConfigCommand::Show => show_config(config, path, format),
        ConfigCommand::Set { key, value } => {
            config.set(&key, &value)?;
            config.save(path)?;
            success(&format!("Set {key} = {value}"));
            Ok(())
        }
        ConfigCommand::Reset => {
            *config = CliConfig::default();
            config.save(path)?;
            success("Configuration reset to defaults");
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", CliConfig::resolve_path(path)?.display());
            Ok(())
        }
    }
}

fn show_config(config: &CliConfig, path: Option<&Path>, format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Quiet => {
            let content = toml::to_string_pretty(config)
                .map_err(|e| crate::CliError::Config(format!("failed to serialize config: {e}")))?;
            print!("{content}");
        }
        OutputFormat::Table => {
            let path = CliConfig::resolve_path(path)?;
            info(&format!("Configuration file: {}", path.display()));
            println!();
            output_single(config, format)?;
        }
        OutputFormat::Json => output_single(config, format)?,
    }
    Ok(())
}
