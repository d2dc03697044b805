//! OIDC protocol error types.
//!
//! Implements OAuth 2.0 and `OpenID` Connect error responses as defined in:
//! - RFC 6749 (OAuth 2.0)
//! - `OpenID` Connect Core 1.0

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pairwise::PairwiseError;

/// OIDC protocol errors.
#[derive(Debug, Error)]
pub enum OidcError {
    /// Invalid request parameters.
    #[error("invalid_request: {0}")]
    InvalidRequest(String),

    /// A protocol mapper could not be configured or applied.
    #[error("mapper error: {0}")]
    Mapper(#[from] PairwiseError),
}

impl OidcError {
    /// Returns the OAuth 2.0 error code.
    ///
    /// A rejected mapper configuration is the caller's fault; a mapper that
    /// fails during issuance is the server's.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Mapper(e) if e.is_config_error() => "invalid_request",
            Self::Mapper(_) => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::Mapper(e) if e.is_config_error() => 400,
            Self::Mapper(_) => 500,
        }
    }

    /// Returns the pairwise mapper error, if this is one.
    #[must_use]
    pub const fn as_mapper_error(&self) -> Option<&PairwiseError> {
        match self {
            Self::Mapper(e) => Some(e),
            _ => None,
        }
    }

    /// Creates an error response for OAuth 2.0/OIDC.
    ///
    /// Mapper detail never reaches the response. A rejected configuration
    /// is described by its message key; an issuance failure only by a
    /// generic text.
    #[must_use]
    pub fn to_error_response(&self) -> ErrorResponse {
        let description = match self {
            Self::Mapper(e) if e.is_config_error() => e.message_key().to_string(),
            Self::Mapper(_) => "token could not be issued".to_string(),
            Self::InvalidRequest(_) => self.to_string(),
        };
        ErrorResponse {
            error: self.error_code().to_string(),
            error_description: Some(description),
            error_uri: None,
        }
    }
}

/// OAuth 2.0 error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub error: String,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// URI with more information about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}

/// Result type for OIDC operations.
pub type OidcResult<T> = Result<T, OidcError>;
