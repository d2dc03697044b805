//! CLI error types.

use kc_protocol_oidc::{OidcError, PairwiseError};
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Settings rejected by validation.
    #[error(transparent)]
    Settings(#[from] kc_core::Error),

    /// Pseudonym computation failed.
    #[error("{key}: {0}", key = .0.message_key())]
    Pairwise(#[from] PairwiseError),

    /// Mapper save failed.
    #[error(transparent)]
    Mapper(#[from] OidcError),

    /// One or more mapper configurations failed validation.
    #[error("validation failed for {0} mapper configuration(s)")]
    Validation(usize),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
