//! HMAC pairwise pseudonym mappers.
//!
//! A pairwise pseudonym is a per-(user, sector) identifier: stable for one
//! sector, unlinkable across sectors. Every mapper here reduces to
//! [`generator::generate`]; they differ in key material, sector mode and
//! which claim receives the result.
//!
//! - [`sector`] - sector identifier resolution
//! - [`generator`] - the deterministic derivation
//! - [`config`] - typed configuration and save-time validation
//! - [`mappers`] - the subject, email and named-claim mappers
//! - [`list`] - aggregation of other clients' pseudonyms
//! - [`error`] - error taxonomy

pub mod config;
pub mod error;
pub mod generator;
pub mod list;
pub mod mappers;
pub mod sector;

pub use config::{
    LocalIdentifierSource, PairwiseMapping, PairwiseVariant, SaltedPairwiseConfig,
    SectorKeyedPairwiseConfig, keys, validate_and_normalize,
};
pub use error::{PairwiseError, PairwiseResult};
pub use generator::{KeyMaterial, Pseudonym, generate, generate_salted, generate_sector_keyed};
pub use list::{
    PSEUDONYM_LIST_MAPPER_ID, PseudonymListConfig, PseudonymListMapper, aggregate_pseudonyms,
    find_static_sector_config,
};
pub use mappers::{
    PairwiseClaimMapper, PairwiseEmailMapper, SimpleSectorPairwiseMapper,
    StaticSectorPairwiseMapper,
};
pub use sector::{SectorIdentifier, SectorMode};
