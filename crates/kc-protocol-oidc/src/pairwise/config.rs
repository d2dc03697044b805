//! Typed pairwise mapper configuration.
//!
//! A saved [`MapperConfig`] is a flat key/value map. This module parses it
//! into one [`PairwiseMapping`] per variant and hosts the save-time
//! [`validate_and_normalize`] step, which is the only place a salt is ever
//! introduced.

use kc_core::PairwiseSettings;
use kc_crypto::{AlgorithmError, HmacAlgorithm, generate_salt};
use tracing::{debug, info, warn};

use super::error::{PairwiseError, PairwiseResult};
use super::generator::{Pseudonym, generate_salted, generate_sector_keyed};
use super::sector::{SectorIdentifier, SectorMode};
use crate::claims::ClaimSet;
use crate::mapper::{MapperConfig, UserInfo, set_claim_nested};

/// Configuration keys used by the pairwise mappers.
pub mod keys {
    /// JCA name of the HMAC algorithm.
    pub const ALGORITHM: &str = "pairwise.algorithm";
    /// Salt for the salted key convention. Write-once.
    pub const SALT: &str = "pairwise.salt";
    /// Sector identifier.
    pub const SECTOR_IDENTIFIER: &str = "pairwise.sectorIdentifier";
    /// User attribute holding the local identifier.
    pub const LOCAL_ID_ATTRIBUTE: &str = "user.attribute";
    /// Target claim name.
    pub const CLAIM_NAME: &str = "claim.name";
    /// Domain appended to pseudonymous email addresses.
    pub const EMAIL_DOMAIN: &str = "pairwise.email.domain";
    /// Clients referenced by a pseudonym list.
    pub const CLIENTS: &str = "pairwise.clients";

    /// Attribute value selecting the user's internal ID.
    pub const USER_ID_MARKER: &str = "id";
    /// Separator of multivalued configuration values.
    pub const LIST_SEPARATOR: &str = "##";
}

/// The four pseudonym mapper variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairwiseVariant {
    /// Salted, static URI sector, rewrites `sub`.
    StaticSector,
    /// Sector-keyed, simple sector, rewrites `sub`.
    SimpleSector,
    /// Salted, static URI sector, rewrites `email`.
    Email,
    /// Sector-keyed, simple sector, writes a named claim.
    NamedClaim,
}

impl PairwiseVariant {
    /// Mapper type ID registered for this variant.
    #[must_use]
    pub const fn mapper_type(self) -> &'static str {
        match self {
            Self::StaticSector => "oidc-hmac-pairwise-subject-mapper",
            Self::SimpleSector => "oidc-hmac-simple-pairwise-subject-mapper",
            Self::Email => "oidc-hmac-pairwise-email-mapper",
            Self::NamedClaim => "oidc-hmac-pairwise-claim-mapper",
        }
    }

    /// Whether the variant uses the salted key convention.
    #[must_use]
    pub const fn is_salted(self) -> bool {
        matches!(self, Self::StaticSector | Self::Email)
    }

    /// How the variant interprets its sector identifier.
    #[must_use]
    pub const fn sector_mode(self) -> SectorMode {
        if self.is_salted() {
            SectorMode::StaticUri
        } else {
            SectorMode::Simple
        }
    }
}

/// Where the local identifier comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalIdentifierSource {
    /// The user's stable internal ID.
    UserId,
    /// The first value of the named user attribute.
    Attribute(String),
}

impl LocalIdentifierSource {
    /// Reads the source from a configuration. An absent or blank attribute
    /// name, or the `id` marker, selects the user ID.
    #[must_use]
    pub fn from_config(config: &MapperConfig) -> Self {
        match config.get_non_blank(keys::LOCAL_ID_ATTRIBUTE) {
            None | Some(keys::USER_ID_MARKER) => Self::UserId,
            Some(attribute) => Self::Attribute(attribute.to_string()),
        }
    }

    /// Resolves the local identifier for `user`.
    ///
    /// Returns `None` when the attribute is missing or its first value is
    /// empty; callers skip the claim in that case.
    #[must_use]
    pub fn resolve(&self, user: &UserInfo) -> Option<String> {
        match self {
            Self::UserId => Some(user.id.to_string()),
            Self::Attribute(name) => user
                .get_attribute(name)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        }
    }
}

// Issuance-time lookup: a name that passed save-time validation but is
// gone from the catalog is fatal, not a config error.
fn algorithm_from_config(config: &MapperConfig) -> PairwiseResult<HmacAlgorithm> {
    match config.get_non_blank(keys::ALGORITHM) {
        Some(name) => HmacAlgorithm::from_name(name).map_err(|e| match e {
            AlgorithmError::Unknown(name) => PairwiseError::UnresolvableAlgorithm(name),
            other => other.into(),
        }),
        None => Ok(HmacAlgorithm::DEFAULT),
    }
}

/// Returns the salt exactly as stored. Blank text counts as absent.
pub(crate) fn configured_salt(config: &MapperConfig) -> Option<&str> {
    config.get(keys::SALT).filter(|s| !s.trim().is_empty())
}

/// Parsed configuration of a salted mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaltedPairwiseConfig {
    /// HMAC algorithm.
    pub algorithm: HmacAlgorithm,
    /// Salt text; its UTF-8 bytes key the MAC.
    pub salt: String,
    /// Static URI sector identifier.
    pub sector: SectorIdentifier,
    /// Local identifier source.
    pub local: LocalIdentifierSource,
}

impl SaltedPairwiseConfig {
    /// Parses a saved configuration. Never generates a salt.
    ///
    /// ## Errors
    ///
    /// - [`PairwiseError::MissingKeyMaterial`] if the salt is absent or blank.
    /// - [`PairwiseError::UnresolvableAlgorithm`] for an algorithm missing
    ///   from the catalog.
    /// - Sector errors from [`SectorIdentifier::resolve`].
    pub fn from_mapper_config(config: &MapperConfig) -> PairwiseResult<Self> {
        let salt = configured_salt(config).ok_or(PairwiseError::MissingKeyMaterial)?;
        Ok(Self {
            algorithm: algorithm_from_config(config)?,
            salt: salt.to_string(),
            sector: SectorIdentifier::resolve(
                config.get(keys::SECTOR_IDENTIFIER),
                SectorMode::StaticUri,
            )?,
            local: LocalIdentifierSource::from_config(config),
        })
    }

    /// Computes the pseudonym for `user`, or `None` if the local identifier
    /// is absent.
    ///
    /// ## Errors
    ///
    /// Propagates generator failures.
    pub fn pseudonym_for(&self, user: &UserInfo) -> PairwiseResult<Option<Pseudonym>> {
        let Some(local_id) = self.local.resolve(user) else {
            return Ok(None);
        };
        generate_salted(self.algorithm, Some(&self.salt), &self.sector, &local_id).map(Some)
    }
}

/// Parsed configuration of a sector-keyed mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorKeyedPairwiseConfig {
    /// HMAC algorithm.
    pub algorithm: HmacAlgorithm,
    /// Simple sector identifier; also the MAC key.
    pub sector: SectorIdentifier,
    /// Local identifier source.
    pub local: LocalIdentifierSource,
}

impl SectorKeyedPairwiseConfig {
    /// Parses a saved configuration.
    ///
    /// ## Errors
    ///
    /// - [`PairwiseError::UnresolvableAlgorithm`] for an algorithm missing
    ///   from the catalog.
    /// - [`PairwiseError::MissingSectorIdentifier`] for a blank sector.
    pub fn from_mapper_config(config: &MapperConfig) -> PairwiseResult<Self> {
        Ok(Self {
            algorithm: algorithm_from_config(config)?,
            sector: SectorIdentifier::resolve(config.get(keys::SECTOR_IDENTIFIER), SectorMode::Simple)?,
            local: LocalIdentifierSource::from_config(config),
        })
    }

    /// Computes the pseudonym for `user`, or `None` if the local identifier
    /// is absent.
    ///
    /// ## Errors
    ///
    /// Propagates generator failures.
    pub fn pseudonym_for(&self, user: &UserInfo) -> PairwiseResult<Option<Pseudonym>> {
        let Some(local_id) = self.local.resolve(user) else {
            return Ok(None);
        };
        generate_sector_keyed(self.algorithm, &self.sector, &local_id).map(Some)
    }
}

/// A parsed pairwise mapper, dispatched by variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairwiseMapping {
    /// Rewrites `sub` with a salted pseudonym.
    StaticSector(SaltedPairwiseConfig),
    /// Rewrites `sub` with a sector-keyed pseudonym.
    SimpleSector(SectorKeyedPairwiseConfig),
    /// Rewrites `email` with `pseudonym@domain`.
    Email {
        /// Salted configuration shared with the subject variant.
        config: SaltedPairwiseConfig,
        /// Configured domain; falls back to the original email's domain.
        domain: Option<String>,
    },
    /// Writes a sector-keyed pseudonym into a custom claim.
    NamedClaim {
        /// Sector-keyed configuration.
        config: SectorKeyedPairwiseConfig,
        /// Target claim name, dotted for nesting.
        claim_name: String,
    },
}

impl PairwiseMapping {
    /// Parses a saved configuration as `variant`.
    ///
    /// ## Errors
    ///
    /// Returns the parse errors of the underlying config type, and
    /// [`PairwiseError::TargetClaimNotSet`] for a named-claim mapper without
    /// a claim name.
    pub fn from_mapper_config(variant: PairwiseVariant, config: &MapperConfig) -> PairwiseResult<Self> {
        Ok(match variant {
            PairwiseVariant::StaticSector => {
                Self::StaticSector(SaltedPairwiseConfig::from_mapper_config(config)?)
            }
            PairwiseVariant::SimpleSector => {
                Self::SimpleSector(SectorKeyedPairwiseConfig::from_mapper_config(config)?)
            }
            PairwiseVariant::Email => Self::Email {
                config: SaltedPairwiseConfig::from_mapper_config(config)?,
                domain: config
                    .get_non_blank(keys::EMAIL_DOMAIN)
                    .map(|d| d.trim_start_matches('@').to_string()),
            },
            PairwiseVariant::NamedClaim => Self::NamedClaim {
                config: SectorKeyedPairwiseConfig::from_mapper_config(config)?,
                claim_name: config
                    .get_non_blank(keys::CLAIM_NAME)
                    .ok_or(PairwiseError::TargetClaimNotSet)?
                    .to_string(),
            },
        })
    }

    /// Computes the pseudonym for `user`.
    ///
    /// ## Errors
    ///
    /// Propagates generator failures.
    pub fn pseudonym_for(&self, user: &UserInfo) -> PairwiseResult<Option<Pseudonym>> {
        match self {
            Self::StaticSector(config) | Self::Email { config, .. } => config.pseudonym_for(user),
            Self::SimpleSector(config) | Self::NamedClaim { config, .. } => config.pseudonym_for(user),
        }
    }

    /// Writes the pseudonym into `claims`.
    ///
    /// An absent local identifier leaves every claim untouched.
    ///
    /// ## Errors
    ///
    /// Propagates generator failures.
    pub fn apply<C: ClaimSet + ?Sized>(&self, claims: &mut C, user: &UserInfo) -> PairwiseResult<()> {
        let Some(pseudonym) = self.pseudonym_for(user)? else {
            debug!(user = %user.id, "local identifier absent; pairwise claim left unchanged");
            return Ok(());
        };

        match self {
            Self::StaticSector(_) | Self::SimpleSector(_) => {
                claims.set_subject(pseudonym.into_string());
            }
            Self::Email { domain, .. } => {
                let domain = domain.clone().or_else(|| {
                    claims
                        .email()
                        .or(user.email.as_deref())
                        .and_then(email_domain)
                        .map(str::to_string)
                });
                match domain {
                    Some(domain) => claims.set_email(format!("{pseudonym}@{domain}")),
                    None => debug!(user = %user.id, "no email domain available; email claim left unchanged"),
                }
            }
            Self::NamedClaim { claim_name, .. } => {
                set_claim_nested(claims.other_claims_mut(), claim_name, pseudonym.into());
            }
        }
        Ok(())
    }
}

fn email_domain(email: &str) -> Option<&str> {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .filter(|d| !d.is_empty())
}

/// Validates and normalizes a configuration at save time.
///
/// In order:
/// 1. Salted variants without a salt get a fresh random one. An existing
///    non-blank salt is never replaced.
/// 2. A missing algorithm is filled from `settings`; a present one must
///    resolve and is rewritten to its canonical name.
/// 3. The sector identifier is resolved in the variant's mode.
/// 4. The result must parse as a [`PairwiseMapping`].
///
/// ## Errors
///
/// Returns the configuration error that blocks the save.
pub fn validate_and_normalize(
    mut config: MapperConfig,
    variant: PairwiseVariant,
    settings: &PairwiseSettings,
) -> PairwiseResult<MapperConfig> {
    if variant.is_salted() && configured_salt(&config).is_none() {
        config = config.with_config(keys::SALT, generate_salt(settings.salt_length));
        info!(mapper = %config.name, "generated pairwise salt");
    }

    let algorithm = match config.get_non_blank(keys::ALGORITHM) {
        Some(name) => HmacAlgorithm::from_name(name)?,
        None => settings.default_algorithm,
    };
    if algorithm.is_legacy() {
        warn!(mapper = %config.name, %algorithm, "pairwise mapper uses a legacy hash algorithm");
    }
    config = config.with_config(keys::ALGORITHM, algorithm.name());

    SectorIdentifier::resolve(config.get(keys::SECTOR_IDENTIFIER), variant.sector_mode())?;

    PairwiseMapping::from_mapper_config(variant, &config)?;
    Ok(config)
}
