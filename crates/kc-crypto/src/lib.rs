//! # kc-crypto
//!
//! Cryptographic primitives for the Keycloak pairwise pseudonym mappers.
//!
//! - [`algorithm`] - the closed catalog of supported HMAC algorithms
//! - [`hash`] - HMAC computation and name-based UUID derivation
//! - [`random`] - secure salt generation
//!
//! Everything here is pure and synchronous. None of it holds shared
//! state, so it is safe to call from any number of request threads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod algorithm;
pub mod hash;
pub mod random;

pub use algorithm::{AlgorithmError, HmacAlgorithm};
pub use hash::{hmac, name_uuid_from_bytes};
pub use random::{DEFAULT_SALT_BYTES, MIN_SALT_BYTES, generate_salt, random_base64, random_bytes};
