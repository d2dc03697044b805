//! End-to-end tests for the pairwise pseudonym mappers.
//!
//! Mapper configurations go through the admin save path of an
//! [`kc_protocol_oidc::InMemoryMapperStore`] and are then applied to real
//! claim sets by the protocol mapper registry.

mod admin_save;
mod derivation;
mod pseudonym_list;
mod token_pipeline;
