//! In-memory protocol mapper configuration store.
//!
//! Stands in for the host's persistent store. Every save runs the mapper's
//! save-time validation, so what the store holds is always normalized. The
//! store is also the [`ClientMapperLookup`] handed to mappers that read
//! sibling client configurations.

use std::collections::HashMap;
use std::sync::Arc;

use kc_core::PairwiseSettings;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{OidcError, OidcResult};
use crate::mapper::{ClientMapperLookup, MapperConfig, MapperOwner, ProtocolMapperRegistry, ValidationContext};
use crate::pairwise::keys;
use crate::pairwise::config::configured_salt;

/// Thread-safe mapper configuration store.
#[derive(Debug)]
pub struct InMemoryMapperStore {
    registry: Arc<ProtocolMapperRegistry>,
    settings: PairwiseSettings,
    mappers: RwLock<HashMap<MapperOwner, Vec<MapperConfig>>>,
    /// Serializes saves and deletes; reads never take it.
    save_lock: Mutex<()>,
}

impl InMemoryMapperStore {
    /// Creates an empty store. The realm owner always exists.
    #[must_use]
    pub fn new(registry: Arc<ProtocolMapperRegistry>, settings: PairwiseSettings) -> Self {
        let mut mappers = HashMap::new();
        mappers.insert(MapperOwner::Realm, Vec::new());
        Self {
            registry,
            settings,
            mappers: RwLock::new(mappers),
            save_lock: Mutex::new(()),
        }
    }

    /// Returns the mapper registry.
    #[must_use]
    pub fn registry(&self) -> &ProtocolMapperRegistry {
        &self.registry
    }

    /// Returns the save-time settings.
    #[must_use]
    pub const fn settings(&self) -> &PairwiseSettings {
        &self.settings
    }

    /// Creates a client. Returns `false` if it already existed.
    pub fn create_client(&self, client_id: impl Into<String>) -> bool {
        let owner = MapperOwner::Client(client_id.into());
        let mut mappers = self.mappers.write();
        if mappers.contains_key(&owner) {
            return false;
        }
        mappers.insert(owner, Vec::new());
        true
    }

    /// Deletes a client together with its mappers.
    ///
    /// Returns the number of mappers dropped, or `None` if the client did
    /// not exist.
    pub fn delete_client(&self, client_id: &str) -> Option<usize> {
        let _guard = self.save_lock.lock();
        let removed = self
            .mappers
            .write()
            .remove(&MapperOwner::Client(client_id.to_string()))?;
        info!(client = %client_id, mappers = removed.len(), "deleted client");
        Some(removed.len())
    }

    /// Validates, normalizes and stores a mapper configuration.
    ///
    /// A configuration with the same ID under the same owner is replaced.
    /// A stored salt survives every re-save: a blank submitted salt keeps
    /// it, a different one is ignored.
    ///
    /// # Errors
    ///
    /// - [`OidcError::InvalidRequest`] if the owning client does not exist
    ///   or the mapper type is not registered.
    /// - [`OidcError::Mapper`] if the mapper rejects the configuration.
    pub fn save(&self, owner: &MapperOwner, config: MapperConfig) -> OidcResult<MapperConfig> {
        let _guard = self.save_lock.lock();

        if !self.mappers.read().contains_key(owner) {
            return Err(OidcError::InvalidRequest(format!("{owner} does not exist")));
        }

        let config = match self.get(owner, config.id) {
            Some(stored) => keep_stored_salt(config, &stored),
            None => config,
        };

        let context = ValidationContext::new(owner, self, &self.settings);
        let config = self.registry.validate_config(config, &context)?;

        let mut mappers = self.mappers.write();
        let Some(list) = mappers.get_mut(owner) else {
            return Err(OidcError::InvalidRequest(format!("{owner} does not exist")));
        };
        match list.iter_mut().find(|m| m.id == config.id) {
            Some(slot) => slot.clone_from(&config),
            None => list.push(config.clone()),
        }

        info!(
            owner = %owner,
            mapper = %config.name,
            mapper_type = %config.mapper_type,
            "saved protocol mapper"
        );
        Ok(config)
    }

    /// Gets a mapper configuration.
    #[must_use]
    pub fn get(&self, owner: &MapperOwner, id: Uuid) -> Option<MapperConfig> {
        self.mappers
            .read()
            .get(owner)
            .and_then(|list| list.iter().find(|m| m.id == id).cloned())
    }

    /// Lists the mapper configurations of an owner.
    #[must_use]
    pub fn list(&self, owner: &MapperOwner) -> Vec<MapperConfig> {
        self.mappers.read().get(owner).cloned().unwrap_or_default()
    }

    /// Deletes a mapper configuration. Returns whether it existed.
    pub fn delete(&self, owner: &MapperOwner, id: Uuid) -> bool {
        let _guard = self.save_lock.lock();
        let mut mappers = self.mappers.write();
        let Some(list) = mappers.get_mut(owner) else {
            return false;
        };
        let before = list.len();
        list.retain(|m| m.id != id);
        let deleted = list.len() != before;
        if deleted {
            debug!(owner = %owner, mapper = %id, "deleted protocol mapper");
        }
        deleted
    }
}

impl ClientMapperLookup for InMemoryMapperStore {
    fn client_mappers(&self, client_id: &str) -> Option<Vec<MapperConfig>> {
        self.mappers
            .read()
            .get(&MapperOwner::Client(client_id.to_string()))
            .cloned()
    }
}

fn keep_stored_salt(config: MapperConfig, stored: &MapperConfig) -> MapperConfig {
    let Some(stored_salt) = configured_salt(stored) else {
        return config;
    };

    let submitted = configured_salt(&config).map(str::to_string);
    match submitted {
        Some(salt) if salt == stored_salt => config,
        Some(_) => {
            warn!(mapper = %config.name, "ignoring attempt to change a pairwise salt");
            config.with_config(keys::SALT, stored_salt)
        }
        None => config.with_config(keys::SALT, stored_salt),
    }
}
