//! Protocol Mapper SPI for customizing token claims.
//!
//! This module provides the protocol mapper framework that the pairwise
//! mappers plug into.
//!
//! ## Design
//!
//! The mapper system follows the SPI (Service Provider Interface) pattern:
//! - [`ProtocolMapper`] defines the contract for mappers, including the
//!   save-time [`ProtocolMapper::validate_config`] step
//! - [`MapperConfig`] is the persisted key/value configuration of one
//!   mapper instance
//! - [`ProtocolMapperRegistry`] manages mapper registration, validation and
//!   application
//! - [`ClientMapperLookup`] is the read-only view of sibling client
//!   configurations handed to mappers that reference other clients
//!
//! ## Token Types
//!
//! Mappers target token surfaces by implementing the corresponding traits:
//! - [`AccessTokenMapper`] - Transforms access tokens
//! - [`IdTokenMapper`] - Transforms ID tokens
//! - [`UserInfoMapper`] - Transforms userinfo responses

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use kc_core::PairwiseSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::claims::{AccessTokenClaims, IdTokenClaims};
use crate::error::{OidcError, OidcResult};
use crate::pairwise::list::PseudonymListMapper;
use crate::pairwise::mappers::{
    PairwiseClaimMapper, PairwiseEmailMapper, SimpleSectorPairwiseMapper,
    StaticSectorPairwiseMapper,
};

/// Config key: include in access tokens.
pub const ACCESS_TOKEN_CLAIM: &str = "access.token.claim";
/// Config key: include in ID tokens.
pub const ID_TOKEN_CLAIM: &str = "id.token.claim";
/// Config key: include in userinfo responses.
pub const USERINFO_TOKEN_CLAIM: &str = "userinfo.token.claim";

/// Configuration for a protocol mapper instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Unique identifier for this mapper instance.
    pub id: Uuid,

    /// Mapper name (user-defined).
    pub name: String,

    /// Protocol mapper type ID (e.g., `"oidc-hmac-pairwise-subject-mapper"`).
    pub mapper_type: String,

    /// Protocol (always `"openid-connect"` for OIDC).
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// Configuration key-value pairs.
    #[serde(default)]
    pub config: HashMap<String, String>,
}

fn default_protocol() -> String {
    "openid-connect".to_string()
}

impl MapperConfig {
    /// Creates a new mapper configuration.
    #[must_use]
    pub fn new(name: impl Into<String>, mapper_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            mapper_type: mapper_type.into(),
            protocol: default_protocol(),
            config: HashMap::new(),
        }
    }

    /// Sets a configuration value.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Gets a configuration value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Gets a configuration value, treating blank text as absent.
    #[must_use]
    pub fn get_non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Gets a configuration value as a boolean.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.config.get(key).and_then(|v| v.parse().ok())
    }

    /// Checks if the mapper should be included in access tokens.
    #[must_use]
    pub fn include_in_access_token(&self) -> bool {
        self.get_bool(ACCESS_TOKEN_CLAIM).unwrap_or(true)
    }

    /// Checks if the mapper should be included in ID tokens.
    #[must_use]
    pub fn include_in_id_token(&self) -> bool {
        self.get_bool(ID_TOKEN_CLAIM).unwrap_or(true)
    }

    /// Checks if the mapper should be included in userinfo responses.
    #[must_use]
    pub fn include_in_userinfo(&self) -> bool {
        self.get_bool(USERINFO_TOKEN_CLAIM).unwrap_or(true)
    }
}

/// Configuration property definition for mapper UIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigProperty {
    /// Property name (config key).
    pub name: String,

    /// Display label.
    pub label: String,

    /// Help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,

    /// Property type.
    pub property_type: ConfigPropertyType,

    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Whether the property is required.
    #[serde(default)]
    pub required: bool,

    /// Whether the property is secret (masked once saved).
    #[serde(default)]
    pub secret: bool,

    /// Options for select types.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<String>,
}

/// Configuration property type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigPropertyType {
    /// Text input.
    String,
    /// Boolean checkbox.
    Boolean,
    /// Select dropdown.
    List,
    /// Several text values, stored `##`-separated.
    MultivaluedString,
    /// Masked text input.
    Password,
}

impl ConfigProperty {
    fn with_type(name: impl Into<String>, label: impl Into<String>, property_type: ConfigPropertyType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            help_text: None,
            property_type,
            default_value: None,
            required: false,
            secret: false,
            options: vec![],
        }
    }

    /// Creates a new string property.
    #[must_use]
    pub fn string(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_type(name, label, ConfigPropertyType::String)
    }

    /// Creates a new boolean property.
    #[must_use]
    pub fn boolean(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_type(name, label, ConfigPropertyType::Boolean).with_default("false")
    }

    /// Creates a new list (select) property.
    #[must_use]
    pub fn list(name: impl Into<String>, label: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            options,
            ..Self::with_type(name, label, ConfigPropertyType::List)
        }
    }

    /// Creates a new multivalued string property.
    #[must_use]
    pub fn multivalued(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_type(name, label, ConfigPropertyType::MultivaluedString)
    }

    /// Creates a new secret property.
    #[must_use]
    pub fn secret(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            secret: true,
            ..Self::with_type(name, label, ConfigPropertyType::Password)
        }
    }

    /// Sets the help text.
    #[must_use]
    pub fn with_help(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    /// Marks the property as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Which configuration object a mapper is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "client_id")]
pub enum MapperOwner {
    /// Realm-level client scope.
    Realm,
    /// A single client.
    Client(String),
}

impl MapperOwner {
    /// Returns the owning client ID, if any.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        match self {
            Self::Realm => None,
            Self::Client(id) => Some(id),
        }
    }
}

impl fmt::Display for MapperOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Realm => f.write_str("realm"),
            Self::Client(id) => write!(f, "client:{id}"),
        }
    }
}

/// Read-only lookup of the mapper configurations of sibling clients.
pub trait ClientMapperLookup: Send + Sync {
    /// Returns the mappers attached to `client_id`, or `None` if the client
    /// does not exist.
    fn client_mappers(&self, client_id: &str) -> Option<Vec<MapperConfig>>;
}

impl ClientMapperLookup for HashMap<String, Vec<MapperConfig>> {
    fn client_mappers(&self, client_id: &str) -> Option<Vec<MapperConfig>> {
        self.get(client_id).cloned()
    }
}

/// Context provided to mappers when a configuration is saved.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Object the mapper is being attached to.
    pub owner: &'a MapperOwner,

    /// Sibling client configurations.
    pub lookup: &'a dyn ClientMapperLookup,

    /// Save-time defaults.
    pub settings: &'a PairwiseSettings,
}

impl<'a> ValidationContext<'a> {
    /// Creates a new validation context.
    #[must_use]
    pub const fn new(
        owner: &'a MapperOwner,
        lookup: &'a dyn ClientMapperLookup,
        settings: &'a PairwiseSettings,
    ) -> Self {
        Self {
            owner,
            lookup,
            settings,
        }
    }
}

impl fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("owner", self.owner)
            .field("settings", self.settings)
            .finish_non_exhaustive()
    }
}

/// Context provided to mappers during token transformation.
#[derive(Clone, Copy)]
pub struct MapperContext<'a> {
    /// User information.
    pub user: Option<&'a UserInfo>,

    /// Client the token is issued to.
    pub client: Option<&'a ClientInfo>,

    /// Realm name.
    pub realm: &'a str,

    /// Requested scopes.
    pub scopes: &'a [String],

    /// Sibling client configurations, for mappers that reference them.
    pub mappers: Option<&'a dyn ClientMapperLookup>,
}

impl<'a> MapperContext<'a> {
    /// Creates a new mapper context.
    #[must_use]
    pub const fn new(realm: &'a str, scopes: &'a [String]) -> Self {
        Self {
            user: None,
            client: None,
            realm,
            scopes,
            mappers: None,
        }
    }

    /// Sets the user information.
    #[must_use]
    pub const fn with_user(mut self, user: &'a UserInfo) -> Self {
        self.user = Some(user);
        self
    }

    /// Sets the client information.
    #[must_use]
    pub const fn with_client(mut self, client: &'a ClientInfo) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the sibling configuration lookup.
    #[must_use]
    pub const fn with_mapper_lookup(mut self, mappers: &'a dyn ClientMapperLookup) -> Self {
        self.mappers = Some(mappers);
        self
    }

    /// Returns the client ID the token is issued to, if known.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client.map(|c| c.client_id.as_str())
    }
}

impl fmt::Debug for MapperContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperContext")
            .field("user", &self.user.map(|u| u.id))
            .field("client", &self.client_id())
            .field("realm", &self.realm)
            .field("scopes", &self.scopes)
            .field("mappers", &self.mappers.is_some())
            .finish()
    }
}

/// User information for mappers.
#[derive(Debug, Clone, Default)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,

    /// Username.
    pub username: String,

    /// Email address.
    pub email: Option<String>,

    /// User attributes.
    pub attributes: HashMap<String, Vec<String>>,
}

impl UserInfo {
    /// Creates a user with the given ID and username.
    #[must_use]
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            ..Self::default()
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Appends an attribute value.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Gets a single attribute value.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Gets all attribute values.
    #[must_use]
    pub fn get_attributes(&self, name: &str) -> Option<&[String]> {
        self.attributes.get(name).map(Vec::as_slice)
    }
}

/// Client information for mappers.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// OAuth `client_id`.
    pub client_id: String,

    /// Client name.
    pub name: Option<String>,
}

impl ClientInfo {
    /// Creates client information.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            name: None,
        }
    }
}

/// Core trait for protocol mappers.
///
/// Protocol mappers customize the claims included in OIDC tokens.
/// Each mapper has a unique ID, display information, and configuration properties.
pub trait ProtocolMapper: Send + Sync {
    /// Returns the unique identifier for this mapper type.
    ///
    /// This ID is used to reference the mapper in configurations.
    /// Example: `"oidc-hmac-pairwise-subject-mapper"`
    fn id(&self) -> &'static str;

    /// Returns the display name for this mapper.
    fn display_name(&self) -> &'static str;

    /// Returns the category for this mapper.
    ///
    /// Used for grouping in admin UIs. Example: `"Token mapper"`
    fn category(&self) -> &'static str;

    /// Returns the help text shown next to the mapper type.
    fn help_text(&self) -> &'static str {
        ""
    }

    /// Returns the configuration properties for this mapper.
    fn config_properties(&self) -> Vec<ConfigProperty>;

    /// Returns the priority for this mapper.
    ///
    /// Lower values execute first. Default is 0.
    fn priority(&self) -> i32 {
        0
    }

    /// Validates and normalizes a configuration when it is saved.
    ///
    /// The returned configuration is what gets persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    fn validate_config(
        &self,
        config: MapperConfig,
        _context: &ValidationContext<'_>,
    ) -> OidcResult<MapperConfig> {
        Ok(config)
    }
}

/// Trait for mappers that transform access tokens.
pub trait AccessTokenMapper: ProtocolMapper {
    /// Transforms an access token by adding/modifying claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformation fails.
    fn transform_access_token(
        &self,
        claims: &mut AccessTokenClaims,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<()>;
}

/// Trait for mappers that transform ID tokens.
pub trait IdTokenMapper: ProtocolMapper {
    /// Transforms an ID token by adding/modifying claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformation fails.
    fn transform_id_token(
        &self,
        claims: &mut IdTokenClaims,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<()>;
}

/// Trait for mappers that transform userinfo responses.
pub trait UserInfoMapper: ProtocolMapper {
    /// Transforms a userinfo response by adding/modifying claims.
    ///
    /// The userinfo response uses the same structure as access tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformation fails.
    fn transform_userinfo(
        &self,
        claims: &mut AccessTokenClaims,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<()>;
}

/// Registry for protocol mappers.
///
/// Manages registration and lookup of mapper implementations.
#[derive(Default)]
pub struct ProtocolMapperRegistry {
    mappers: HashMap<String, Arc<dyn ProtocolMapper>>,
    access_token_mappers: HashMap<String, Arc<dyn AccessTokenMapper>>,
    id_token_mappers: HashMap<String, Arc<dyn IdTokenMapper>>,
    userinfo_mappers: HashMap<String, Arc<dyn UserInfoMapper>>,
}

impl fmt::Debug for ProtocolMapperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolMapperRegistry")
            .field("mappers", &self.mapper_ids())
            .finish()
    }
}

impl ProtocolMapperRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the pairwise mappers registered.
    #[must_use]
    pub fn with_pairwise_mappers() -> Self {
        let mut registry = Self::new();

        registry.register_mapper(Arc::new(StaticSectorPairwiseMapper));
        registry.register_mapper(Arc::new(SimpleSectorPairwiseMapper));
        registry.register_mapper(Arc::new(PairwiseEmailMapper));
        registry.register_mapper(Arc::new(PairwiseClaimMapper));
        registry.register_mapper(Arc::new(PseudonymListMapper));

        registry
    }

    /// Registers a mapper that implements all token type traits.
    pub fn register_mapper<M>(&mut self, mapper: Arc<M>)
    where
        M: AccessTokenMapper + IdTokenMapper + UserInfoMapper + 'static,
    {
        let id = mapper.id().to_string();

        self.mappers.insert(id.clone(), mapper.clone() as Arc<dyn ProtocolMapper>);
        self.access_token_mappers.insert(id.clone(), mapper.clone() as Arc<dyn AccessTokenMapper>);
        self.id_token_mappers.insert(id.clone(), mapper.clone() as Arc<dyn IdTokenMapper>);
        self.userinfo_mappers.insert(id, mapper as Arc<dyn UserInfoMapper>);
    }

    /// Gets a mapper by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<dyn ProtocolMapper>> {
        self.mappers.get(id)
    }

    /// Returns all registered mapper IDs, sorted.
    #[must_use]
    pub fn mapper_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.mappers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Runs the save-time validation of the mapper named by
    /// `config.mapper_type`.
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::InvalidRequest`] for an unregistered mapper type,
    /// otherwise whatever the mapper's validation returns.
    pub fn validate_config(
        &self,
        config: MapperConfig,
        context: &ValidationContext<'_>,
    ) -> OidcResult<MapperConfig> {
        let mapper = self.get(&config.mapper_type).ok_or_else(|| {
            OidcError::InvalidRequest(format!(
                "unknown protocol mapper type '{}'",
                config.mapper_type
            ))
        })?;
        mapper.validate_config(config, context)
    }

    fn ordered<'c>(
        &self,
        mapper_configs: &'c [MapperConfig],
        include: fn(&MapperConfig) -> bool,
    ) -> Vec<&'c MapperConfig> {
        let mut configs: Vec<_> = mapper_configs.iter().filter(|c| include(c)).collect();
        configs.sort_by_key(|c| self.get(&c.mapper_type).map_or(0, |m| m.priority()));
        configs
    }

    /// Applies all configured mappers to access token claims.
    ///
    /// # Errors
    ///
    /// Returns an error if any mapper fails.
    pub fn apply_access_token_mappers(
        &self,
        claims: &mut AccessTokenClaims,
        mapper_configs: &[MapperConfig],
        context: &MapperContext<'_>,
    ) -> OidcResult<()> {
        for config in self.ordered(mapper_configs, MapperConfig::include_in_access_token) {
            match self.access_token_mappers.get(&config.mapper_type) {
                Some(mapper) => mapper.transform_access_token(claims, config, context)?,
                None => debug!(mapper_type = %config.mapper_type, "no access token mapper registered"),
            }
        }
        Ok(())
    }

    /// Applies all configured mappers to ID token claims.
    ///
    /// # Errors
    ///
    /// Returns an error if any mapper fails.
    pub fn apply_id_token_mappers(
        &self,
        claims: &mut IdTokenClaims,
        mapper_configs: &[MapperConfig],
        context: &MapperContext<'_>,
    ) -> OidcResult<()> {
        for config in self.ordered(mapper_configs, MapperConfig::include_in_id_token) {
            match self.id_token_mappers.get(&config.mapper_type) {
                Some(mapper) => mapper.transform_id_token(claims, config, context)?,
                None => debug!(mapper_type = %config.mapper_type, "no ID token mapper registered"),
            }
        }
        Ok(())
    }

    /// Applies all configured mappers to a userinfo response.
    ///
    /// # Errors
    ///
    /// Returns an error if any mapper fails.
    pub fn apply_userinfo_mappers(
        &self,
        claims: &mut AccessTokenClaims,
        mapper_configs: &[MapperConfig],
        context: &MapperContext<'_>,
    ) -> OidcResult<()> {
        for config in self.ordered(mapper_configs, MapperConfig::include_in_userinfo) {
            match self.userinfo_mappers.get(&config.mapper_type) {
                Some(mapper) => mapper.transform_userinfo(claims, config, context)?,
                None => debug!(mapper_type = %config.mapper_type, "no userinfo mapper registered"),
            }
        }
        Ok(())
    }
}

/// Sets a claim value, supporting nested paths (e.g., `"pairwise.sub"`).
///
/// A non-object value in the way of the path is replaced by an object.
pub(crate) fn set_claim_nested(
    claims: &mut HashMap<String, serde_json::Value>,
    path: &str,
    value: serde_json::Value,
) {
    let Some((head, rest)) = path.split_once('.') else {
        claims.insert(path.to_string(), value);
        return;
    };

    let entry = claims
        .entry(head.to_string())
        .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
    if !entry.is_object() {
        *entry = serde_json::Value::Object(serde_json::Map::new());
    }
    if let serde_json::Value::Object(obj) = entry {
        set_in_object(obj, rest, value);
    }
}

/// Merges `entries` into the object claim at a dotted `path`.
///
/// Existing keys of that object are kept unless `entries` overwrites them;
/// a missing or non-object claim is replaced by `entries`.
pub(crate) fn merge_claim_nested(
    claims: &mut HashMap<String, serde_json::Value>,
    path: &str,
    entries: serde_json::Map<String, serde_json::Value>,
) {
    let merged = match get_claim_nested(claims, path) {
        Some(serde_json::Value::Object(existing)) => {
            let mut merged = existing.clone();
            merged.extend(entries);
            merged
        }
        _ => entries,
    };
    set_claim_nested(claims, path, serde_json::Value::Object(merged));
}

fn get_claim_nested<'a>(
    claims: &'a HashMap<String, serde_json::Value>,
    path: &str,
) -> Option<&'a serde_json::Value> {
    let mut parts = path.split('.');
    let mut value = claims.get(parts.next()?)?;
    for part in parts {
        value = value.get(part)?;
    }
    Some(value)
}

fn set_in_object(
    obj: &mut serde_json::Map<String, serde_json::Value>,
    path: &str,
    value: serde_json::Value,
) {
    let Some((head, rest)) = path.split_once('.') else {
        obj.insert(path.to_string(), value);
        return;
    };

    let entry = obj
        .entry(head)
        .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
    if !entry.is_object() {
        *entry = serde_json::Value::Object(serde_json::Map::new());
    }
    if let serde_json::Value::Object(child) = entry {
        set_in_object(child, rest, value);
    }
}
