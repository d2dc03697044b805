//! # kc-pairwise
//!
//! Administration tool for the HMAC pairwise pseudonym mappers.

#![forbid(unsafe_code)]

use clap::Parser;
use kc_cli::{
    cli::{Cli, Command},
    commands::{run_algorithms, run_config, run_generate, run_salt, run_validate},
    config::CliConfig,
    output::error,
};
use kc_core::LoggingConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(verbose: bool, logging: &LoggingConfig) -> kc_cli::CliResult<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if let Ok(directive) = std::env::var("RUST_LOG") {
        EnvFilter::try_new(&directive)
            .map_err(|e| kc_cli::CliError::Config(format!("invalid RUST_LOG '{directive}': {e}")))?
    } else {
        logging.env_filter()?
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(logging.ansi)
                .with_writer(std::io::stderr),
        )
        .init();
    Ok(())
}

fn run(cli: Cli) -> kc_cli::CliResult<()> {
    let path = cli.config.as_deref();
    let mut config = CliConfig::load(path)?;
    init_tracing(cli.verbose, &config.settings.logging)?;

    let format = cli.output.unwrap_or(config.output_format);
    let pairwise = config.settings.pairwise.clone();
    tracing::debug!(?format, algorithm = %pairwise.default_algorithm, "configuration loaded");

    match cli.command {
        Command::Algorithms => run_algorithms(pairwise.default_algorithm, format),
        Command::Salt(args) => run_salt(args.length.unwrap_or(pairwise.salt_length), format),
        Command::Generate(args) => run_generate(&args, pairwise.default_algorithm, format),
        Command::Validate(args) => run_validate(&args.file, &pairwise, format),
        Command::Config(cmd) => run_config(cmd, &mut config, path, format),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error(&e.to_string());
        std::process::exit(1);
    }
}
