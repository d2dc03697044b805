//! # kc-protocol-oidc
//!
//! `OpenID` Connect protocol mappers for Keycloak Rust: the mapper SPI and
//! the HMAC pairwise pseudonym mappers built on it.
//!
//! ## Modules
//!
//! - [`claims`] - JWT claim types for access and ID tokens
//! - [`error`] - OIDC error types following RFC 6749
//! - [`mapper`] - Protocol mapper SPI and registry
//! - [`mapper_store`] - In-memory mapper configuration store
//! - [`pairwise`] - Pairwise pseudonym generation and mappers
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kc_protocol_oidc::{InMemoryMapperStore, MapperConfig, MapperOwner, ProtocolMapperRegistry};
//! use kc_protocol_oidc::pairwise::keys;
//!
//! let store = InMemoryMapperStore::new(
//!     Arc::new(ProtocolMapperRegistry::with_pairwise_mappers()),
//!     Default::default(),
//! );
//! store.create_client("app");
//! let saved = store.save(
//!     &MapperOwner::Client("app".into()),
//!     MapperConfig::new("pairwise sub", "oidc-hmac-pairwise-subject-mapper")
//!         .with_config(keys::SECTOR_IDENTIFIER, "https://rp.example.org/sectors.json"),
//! )?;
//! assert!(saved.get(keys::SALT).is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod claims;
pub mod error;
pub mod mapper;
pub mod mapper_store;
pub mod pairwise;

pub use claims::{AccessTokenClaims, Audience, ClaimSet, IdTokenClaims};
pub use error::{ErrorResponse, OidcError, OidcResult};
pub use mapper::{
    AccessTokenMapper, ClientInfo, ClientMapperLookup, ConfigProperty, ConfigPropertyType,
    IdTokenMapper, MapperConfig, MapperContext, MapperOwner, ProtocolMapper,
    ProtocolMapperRegistry, UserInfo, UserInfoMapper, ValidationContext,
};
pub use mapper_store::InMemoryMapperStore;
pub use pairwise::{PairwiseError, PairwiseResult, Pseudonym};
