//! # kc-cli
//!
//! Administration CLI for the HMAC pairwise pseudonym mappers.
//!
//! This crate provides command-line utilities for:
//! - Listing the supported HMAC algorithms
//! - Generating salts
//! - Computing a pseudonym from explicit inputs
//! - Running save-time validation over exported mapper configurations
//! - Managing the CLI configuration file

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
