//! Keyed-hash algorithm catalog.
//!
//! The catalog is a closed set of HMAC constructions. Names follow the
//! JCA `Mac` naming that existing realm exports already carry
//! (`HmacSHA256`, `HmacSHA3-512`, ...), so persisted mapper
//! configurations keep resolving after an upgrade.
//!
//! MD5 and SHA-1 are kept for configurations created before the SHA-2
//! family became the default. New configurations should not pick them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for algorithm operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgorithmError {
    /// The name is not part of the catalog.
    #[error("unknown algorithm: {0}")]
    Unknown(String),

    /// The algorithm rejected the supplied key.
    #[error("invalid key for {algorithm}: {reason}")]
    InvalidKey {
        /// Algorithm name.
        algorithm: &'static str,
        /// Provider message.
        reason: String,
    },
}

/// Supported HMAC algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HmacAlgorithm {
    /// HMAC over MD5 (legacy).
    #[serde(rename = "HmacMD5")]
    Md5,
    /// HMAC over SHA-1 (legacy).
    #[serde(rename = "HmacSHA1")]
    Sha1,
    /// HMAC over SHA-224.
    #[serde(rename = "HmacSHA224")]
    Sha224,
    /// HMAC over SHA-256.
    #[serde(rename = "HmacSHA256")]
    Sha256,
    /// HMAC over SHA-384.
    #[serde(rename = "HmacSHA384")]
    Sha384,
    /// HMAC over SHA-512.
    #[serde(rename = "HmacSHA512")]
    Sha512,
    /// HMAC over SHA-512/224.
    #[serde(rename = "HmacSHA512/224")]
    Sha512_224,
    /// HMAC over SHA-512/256.
    #[serde(rename = "HmacSHA512/256")]
    Sha512_256,
    /// HMAC over SHA3-224.
    #[serde(rename = "HmacSHA3-224")]
    Sha3_224,
    /// HMAC over SHA3-256.
    #[serde(rename = "HmacSHA3-256")]
    Sha3_256,
    /// HMAC over SHA3-384.
    #[serde(rename = "HmacSHA3-384")]
    Sha3_384,
    /// HMAC over SHA3-512.
    #[serde(rename = "HmacSHA3-512")]
    Sha3_512,
}

impl HmacAlgorithm {
    /// Every algorithm in the catalog, in admin-console display order.
    pub const ALL: [Self; 12] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
        Self::Sha512_224,
        Self::Sha512_256,
        Self::Sha3_224,
        Self::Sha3_256,
        Self::Sha3_384,
        Self::Sha3_512,
    ];

    /// Algorithm used when a configuration does not name one.
    pub const DEFAULT: Self = Self::Sha256;

    /// Returns the catalog name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md5 => "HmacMD5",
            Self::Sha1 => "HmacSHA1",
            Self::Sha224 => "HmacSHA224",
            Self::Sha256 => "HmacSHA256",
            Self::Sha384 => "HmacSHA384",
            Self::Sha512 => "HmacSHA512",
            Self::Sha512_224 => "HmacSHA512/224",
            Self::Sha512_256 => "HmacSHA512/256",
            Self::Sha3_224 => "HmacSHA3-224",
            Self::Sha3_256 => "HmacSHA3-256",
            Self::Sha3_384 => "HmacSHA3-384",
            Self::Sha3_512 => "HmacSHA3-512",
        }
    }

    /// Returns the MAC output length in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha224 | Self::Sha512_224 | Self::Sha3_224 => 28,
            Self::Sha256 | Self::Sha512_256 | Self::Sha3_256 => 32,
            Self::Sha384 | Self::Sha3_384 => 48,
            Self::Sha512 | Self::Sha3_512 => 64,
        }
    }

    /// Returns whether the underlying digest is considered legacy.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::Md5 | Self::Sha1)
    }

    /// Returns the catalog names, for admin choice lists.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|a| a.name()).collect()
    }

    /// Resolves a catalog name.
    ///
    /// Matching ignores ASCII case and surrounding whitespace.
    ///
    /// ## Errors
    ///
    /// Returns [`AlgorithmError::Unknown`] carrying the offending name.
    pub fn from_name(name: &str) -> Result<Self, AlgorithmError> {
        let trimmed = name.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| AlgorithmError::Unknown(name.to_string()))
    }
}

impl Default for HmacAlgorithm {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for HmacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HmacAlgorithm {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}
