//! Pseudonym derivation.
//!
//! `pseudonym = nameUUID(HMAC(key, message))`, where the key and message
//! depend on the key convention:
//!
//! | Convention | Key | Message |
//! |---|---|---|
//! | salted | salt | sector identifier, then local identifier |
//! | sector-keyed | sector identifier | local identifier |
//!
//! The message order is part of the output contract. Swapping it changes
//! every pseudonym ever issued.

use std::fmt;

use kc_crypto::{HmacAlgorithm, hmac, name_uuid_from_bytes};
use serde::{Deserialize, Serialize};

use super::error::{PairwiseError, PairwiseResult};
use super::sector::SectorIdentifier;

/// A derived pseudonymous identifier.
///
/// Always a 36-character lowercase hyphenated UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pseudonym(String);

impl Pseudonym {
    /// Returns the pseudonym text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the pseudonym, returning its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Pseudonym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Pseudonym> for String {
    fn from(p: Pseudonym) -> Self {
        p.0
    }
}

impl From<Pseudonym> for serde_json::Value {
    fn from(p: Pseudonym) -> Self {
        Self::String(p.0)
    }
}

/// Key material for one derivation.
#[derive(Debug, Clone, Copy)]
pub enum KeyMaterial<'a> {
    /// Salted convention: the salt keys the MAC.
    Salt(&'a [u8]),
    /// Sector-keyed convention: the sector identifier keys the MAC.
    SectorIdentifier,
}

/// Derives a pseudonym.
///
/// ## Errors
///
/// - [`PairwiseError::MissingKeyMaterial`] for an empty salt.
/// - [`PairwiseError::KeyedHash`] if the provider rejects the key.
pub fn generate(
    algorithm: HmacAlgorithm,
    key: KeyMaterial<'_>,
    sector: &SectorIdentifier,
    local_id: &str,
) -> PairwiseResult<Pseudonym> {
    let digest = match key {
        KeyMaterial::Salt(salt) => {
            if salt.is_empty() {
                return Err(PairwiseError::MissingKeyMaterial);
            }
            hmac(algorithm, salt, &[sector.as_bytes(), local_id.as_bytes()])?
        }
        KeyMaterial::SectorIdentifier => hmac(algorithm, sector.as_bytes(), &[local_id.as_bytes()])?,
    };

    Ok(Pseudonym(name_uuid_from_bytes(&digest).to_string()))
}

/// Derives a pseudonym with the salted convention.
///
/// ## Errors
///
/// Returns [`PairwiseError::MissingKeyMaterial`] if `salt` is absent or
/// blank, which means the configuration never went through save-time
/// validation.
pub fn generate_salted(
    algorithm: HmacAlgorithm,
    salt: Option<&str>,
    sector: &SectorIdentifier,
    local_id: &str,
) -> PairwiseResult<Pseudonym> {
    let salt = salt
        .filter(|s| !s.trim().is_empty())
        .ok_or(PairwiseError::MissingKeyMaterial)?;
    generate(algorithm, KeyMaterial::Salt(salt.as_bytes()), sector, local_id)
}

/// Derives a pseudonym with the sector-keyed convention.
///
/// ## Errors
///
/// Returns [`PairwiseError::KeyedHash`] if the provider rejects the key.
pub fn generate_sector_keyed(
    algorithm: HmacAlgorithm,
    sector: &SectorIdentifier,
    local_id: &str,
) -> PairwiseResult<Pseudonym> {
    generate(algorithm, KeyMaterial::SectorIdentifier, sector, local_id)
}
