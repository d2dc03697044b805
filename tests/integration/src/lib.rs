//! Fixtures for the pairwise mapper integration tests.
//!
//! [`TestRealm`] wraps a mapper store with the pairwise mappers registered
//! and issues tokens for a client the way the token endpoint would.

#![forbid(unsafe_code)]
#![allow(missing_docs, clippy::missing_panics_doc, clippy::must_use_candidate)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use kc_core::PairwiseSettings;
use kc_protocol_oidc::pairwise::{PSEUDONYM_LIST_MAPPER_ID, PairwiseVariant, keys};
use kc_protocol_oidc::{
    AccessTokenClaims, ClientInfo, IdTokenClaims, InMemoryMapperStore, MapperConfig,
    MapperContext, MapperOwner, OidcResult, ProtocolMapperRegistry, UserInfo,
};
use uuid::Uuid;

pub const ISSUER: &str = "https://sso.example.com/realms/test";
pub const REALM: &str = "test";
pub const USER_ID: &str = "608b8580-3a2e-4a3d-8b47-5b8d6e3c1f90";
pub const STATIC_SECTOR: &str = "http://a-static-url.de/sector_identifiers.json";
pub const SALT: &str = "P5ZD+fqPLDTW";

/// Initializes tracing once for the test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("kc_protocol_oidc=debug")
        .with_test_writer()
        .try_init();
}

/// The user every scenario issues tokens for.
pub fn user() -> UserInfo {
    let id = Uuid::parse_str(USER_ID).expect("valid user id");
    UserInfo::new(id, "alice").with_email("alice@example.org")
}

pub fn static_sector_mapper(sector: &str, salt: Option<&str>) -> MapperConfig {
    let config = MapperConfig::new("pairwise subject", PairwiseVariant::StaticSector.mapper_type())
        .with_config(keys::SECTOR_IDENTIFIER, sector);
    match salt {
        Some(salt) => config.with_config(keys::SALT, salt),
        None => config,
    }
}

pub fn simple_sector_mapper(sector: &str, algorithm: &str) -> MapperConfig {
    MapperConfig::new("pairwise simple subject", PairwiseVariant::SimpleSector.mapper_type())
        .with_config(keys::SECTOR_IDENTIFIER, sector)
        .with_config(keys::ALGORITHM, algorithm)
}

pub fn list_mapper(claim_name: &str, clients: &[&str]) -> MapperConfig {
    MapperConfig::new("pairwise ids", PSEUDONYM_LIST_MAPPER_ID)
        .with_config(keys::CLAIM_NAME, claim_name)
        .with_config(keys::CLIENTS, clients.join(keys::LIST_SEPARATOR))
}

/// A realm with clients and their stored mappers.
pub struct TestRealm {
    pub store: InMemoryMapperStore,
}

impl TestRealm {
    pub fn new(clients: &[&str]) -> Self {
        init_tracing();
        let store = InMemoryMapperStore::new(
            Arc::new(ProtocolMapperRegistry::with_pairwise_mappers()),
            PairwiseSettings::default(),
        );
        for client in clients {
            store.create_client(*client);
        }
        Self { store }
    }

    pub fn save(&self, client_id: &str, config: MapperConfig) -> OidcResult<MapperConfig> {
        self.store.save(&MapperOwner::Client(client_id.to_string()), config)
    }

    fn mappers(&self, client_id: &str) -> Vec<MapperConfig> {
        self.store.list(&MapperOwner::Client(client_id.to_string()))
    }

    pub fn access_token(&self, client_id: &str, user: &UserInfo) -> OidcResult<AccessTokenClaims> {
        let client = ClientInfo::new(client_id);
        let context = MapperContext::new(REALM, &[])
            .with_user(user)
            .with_client(&client)
            .with_mapper_lookup(&self.store);

        let mut claims = AccessTokenClaims::new(
            ISSUER.to_string(),
            user.id.to_string(),
            Utc::now() + Duration::minutes(5),
        );
        claims.email.clone_from(&user.email);
        self.store
            .registry()
            .apply_access_token_mappers(&mut claims, &self.mappers(client_id), &context)?;
        Ok(claims)
    }

    pub fn id_token(&self, client_id: &str, user: &UserInfo) -> OidcResult<IdTokenClaims> {
        let client = ClientInfo::new(client_id);
        let context = MapperContext::new(REALM, &[])
            .with_user(user)
            .with_client(&client)
            .with_mapper_lookup(&self.store);

        let mut claims = IdTokenClaims::new(
            ISSUER.to_string(),
            user.id.to_string(),
            client_id,
            Utc::now() + Duration::minutes(5),
        );
        self.store
            .registry()
            .apply_id_token_mappers(&mut claims, &self.mappers(client_id), &context)?;
        Ok(claims)
    }

    pub fn userinfo(&self, client_id: &str, user: &UserInfo) -> OidcResult<AccessTokenClaims> {
        let client = ClientInfo::new(client_id);
        let context = MapperContext::new(REALM, &[])
            .with_user(user)
            .with_client(&client)
            .with_mapper_lookup(&self.store);

        let mut claims = AccessTokenClaims::new(
            ISSUER.to_string(),
            user.id.to_string(),
            Utc::now() + Duration::minutes(5),
        );
        self.store
            .registry()
            .apply_userinfo_mappers(&mut claims, &self.mappers(client_id), &context)?;
        Ok(claims)
    }
}
