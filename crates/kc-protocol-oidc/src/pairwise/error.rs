//! Pairwise mapper error types.
//!
//! Configuration errors are raised when an administrator saves a mapper
//! and block the save. They carry a stable message key plus the offending
//! values so the admin console can localize them.
//!
//! The remaining variants only surface at token issuance and mean the
//! save-time validation was bypassed or the runtime changed underneath a
//! saved configuration. They fail the issuance and are never retried.

use kc_crypto::AlgorithmError;
use thiserror::Error;

/// Errors raised by the pairwise mappers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairwiseError {
    /// The configured algorithm is not in the catalog.
    #[error("unknown pairwise algorithm '{0}'")]
    UnknownAlgorithm(String),

    /// The sector identifier is empty or absent.
    #[error("sector identifier is missing")]
    MissingSectorIdentifier,

    /// The sector identifier is not an absolute URI with scheme and host.
    #[error("sector identifier '{0}' is not an absolute URI with scheme and host")]
    MalformedSectorIdentifier(String),

    /// A pseudonym list mapper has no target claim.
    #[error("target claim name is not set")]
    TargetClaimNotSet,

    /// A pseudonym list mapper is not attached to a client.
    #[error("pseudonym list mappers can only be attached to a client")]
    WrongMapperType,

    /// A referenced client has no usable pairwise subject mapper.
    #[error("client '{0}' does not exist or has no single pairwise subject mapper")]
    ClientDoesNotExist(String),

    /// A saved algorithm no longer resolves at issuance.
    #[error("pairwise algorithm '{0}' is not available in this runtime")]
    UnresolvableAlgorithm(String),

    /// A salted mapper reached issuance without a salt.
    #[error("pairwise salt is missing; the mapper configuration was never saved through validation")]
    MissingKeyMaterial,

    /// The keyed hash provider failed.
    #[error("keyed hash failed: {0}")]
    KeyedHash(String),
}

impl PairwiseError {
    /// Returns the admin console message key.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::UnknownAlgorithm(_) => "pairwiseUnknownAlgorithm",
            Self::MissingSectorIdentifier => "pairwiseMissingSectorIdentifier",
            Self::MalformedSectorIdentifier(_) => "pairwiseMalformedSectorIdentifier",
            Self::TargetClaimNotSet => "pairwiseTargetClaimNotSet",
            Self::WrongMapperType => "pairwiseWrongMapperType",
            Self::ClientDoesNotExist(_) => "pairwiseClientDoesNotExist",
            Self::UnresolvableAlgorithm(_) => "pairwiseUnresolvableAlgorithm",
            Self::MissingKeyMaterial => "pairwiseMissingSalt",
            Self::KeyedHash(_) => "pairwiseKeyedHashFailed",
        }
    }

    /// Returns the message parameters, in placeholder order.
    #[must_use]
    pub fn parameters(&self) -> Vec<String> {
        match self {
            Self::UnknownAlgorithm(value)
            | Self::MalformedSectorIdentifier(value)
            | Self::ClientDoesNotExist(value)
            | Self::UnresolvableAlgorithm(value)
            | Self::KeyedHash(value) => vec![value.clone()],
            Self::MissingSectorIdentifier
            | Self::TargetClaimNotSet
            | Self::WrongMapperType
            | Self::MissingKeyMaterial => Vec::new(),
        }
    }

    /// Returns whether this error belongs to the save-time taxonomy.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        !self.is_fatal()
    }

    /// Returns whether this error aborts a token issuance.
    ///
    /// Fatal errors mean a saved configuration can no longer be evaluated.
    /// Retrying the same deterministic computation cannot succeed.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnresolvableAlgorithm(_) | Self::MissingKeyMaterial | Self::KeyedHash(_)
        )
    }
}

impl From<AlgorithmError> for PairwiseError {
    fn from(error: AlgorithmError) -> Self {
        match error {
            AlgorithmError::Unknown(name) => Self::UnknownAlgorithm(name),
            AlgorithmError::InvalidKey { algorithm, reason } => {
                Self::KeyedHash(format!("{algorithm}: {reason}"))
            }
        }
    }
}

/// Result type for pairwise operations.
pub type PairwiseResult<T> = Result<T, PairwiseError>;
