//! Pseudonym list aggregation.
//!
//! A list mapper attached to one client writes a JSON object claim
//! mapping other client IDs to the pseudonym each of those clients' own
//! static-sector mapper issues for the user. The referenced clients keep
//! sole ownership of their salt, sector and algorithm; the list only reads
//! them through a [`ClientMapperLookup`].

use serde_json::{Map, Value};
use tracing::debug;

use super::config::{PairwiseVariant, SaltedPairwiseConfig, keys};
use super::error::{PairwiseError, PairwiseResult};
use crate::claims::{AccessTokenClaims, ClaimSet, IdTokenClaims};
use crate::error::OidcResult;
use crate::mapper::{
    AccessTokenMapper, ClientMapperLookup, ConfigProperty, IdTokenMapper, MapperConfig,
    MapperContext, MapperOwner, ProtocolMapper, UserInfo, UserInfoMapper, ValidationContext,
    merge_claim_nested,
};
use crate::pairwise::mappers::inclusion_properties;

/// Mapper type ID of [`PseudonymListMapper`].
pub const PSEUDONYM_LIST_MAPPER_ID: &str = "oidc-hmac-pairwise-list-mapper";

/// Parsed list mapper configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudonymListConfig {
    /// Claim receiving the client-to-pseudonym object.
    pub claim_name: String,
    /// Referenced client IDs, in configured order, without duplicates.
    pub clients: Vec<String>,
}

impl PseudonymListConfig {
    /// Parses a configuration without validating it.
    #[must_use]
    pub fn from_mapper_config(config: &MapperConfig) -> Self {
        let mut clients: Vec<String> = Vec::new();
        for client in config
            .get(keys::CLIENTS)
            .unwrap_or_default()
            .split(keys::LIST_SEPARATOR)
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            if !clients.iter().any(|c| c == client) {
                clients.push(client.to_string());
            }
        }

        Self {
            claim_name: config.get_non_blank(keys::CLAIM_NAME).unwrap_or_default().to_string(),
            clients,
        }
    }
}

/// Returns the single static-sector mapper of `client_id`.
///
/// `None` if the client does not exist, or has zero or several such
/// mappers.
#[must_use]
pub fn find_static_sector_config(
    lookup: &dyn ClientMapperLookup,
    client_id: &str,
) -> Option<MapperConfig> {
    let mut matching = lookup
        .client_mappers(client_id)?
        .into_iter()
        .filter(|m| m.mapper_type == PairwiseVariant::StaticSector.mapper_type());

    let config = matching.next()?;
    matching.next().is_none().then_some(config)
}

/// Computes the pseudonym every referenced client would issue for `user`.
///
/// Clients without a usable static-sector mapper, and clients whose local
/// identifier is absent for this user, are skipped.
///
/// ## Errors
///
/// A referenced configuration that cannot be evaluated (for example one
/// without a salt) aborts the aggregation.
pub fn aggregate_pseudonyms(
    list: &PseudonymListConfig,
    lookup: &dyn ClientMapperLookup,
    user: &UserInfo,
) -> PairwiseResult<Map<String, Value>> {
    let mut pseudonyms = Map::new();

    for client_id in &list.clients {
        let Some(config) = find_static_sector_config(lookup, client_id) else {
            debug!(client = %client_id, "no single pairwise subject mapper; skipping list entry");
            continue;
        };

        let config = SaltedPairwiseConfig::from_mapper_config(&config)?;
        match config.pseudonym_for(user)? {
            Some(pseudonym) => {
                pseudonyms.insert(client_id.clone(), pseudonym.into());
            }
            None => debug!(client = %client_id, user = %user.id, "local identifier absent; skipping list entry"),
        }
    }

    Ok(pseudonyms)
}

fn validate_list(config: &MapperConfig, context: &ValidationContext<'_>) -> PairwiseResult<()> {
    if !matches!(context.owner, MapperOwner::Client(_)) {
        return Err(PairwiseError::WrongMapperType);
    }

    let list = PseudonymListConfig::from_mapper_config(config);
    if list.claim_name.is_empty() {
        return Err(PairwiseError::TargetClaimNotSet);
    }

    for client_id in &list.clients {
        if find_static_sector_config(context.lookup, client_id).is_none() {
            return Err(PairwiseError::ClientDoesNotExist(client_id.clone()));
        }
    }
    Ok(())
}

fn apply_list<C: ClaimSet + ?Sized>(
    claims: &mut C,
    config: &MapperConfig,
    context: &MapperContext<'_>,
) -> OidcResult<()> {
    let (Some(user), Some(lookup)) = (context.user, context.mappers) else {
        debug!(mapper = %config.name, "no user or mapper lookup in context; skipping pseudonym list");
        return Ok(());
    };

    let list = PseudonymListConfig::from_mapper_config(config);
    if list.claim_name.is_empty() {
        debug!(mapper = %config.name, "pseudonym list has no target claim; skipping");
        return Ok(());
    }

    let pseudonyms = aggregate_pseudonyms(&list, lookup, user)?;
    if pseudonyms.is_empty() {
        return Ok(());
    }

    merge_claim_nested(claims.other_claims_mut(), &list.claim_name, pseudonyms);
    Ok(())
}

/// Writes the pseudonyms of other clients into one object claim.
#[derive(Debug, Clone, Copy)]
pub struct PseudonymListMapper;

impl ProtocolMapper for PseudonymListMapper {
    fn id(&self) -> &'static str {
        PSEUDONYM_LIST_MAPPER_ID
    }

    fn display_name(&self) -> &'static str {
        "Pairwise pseudonym list"
    }

    fn category(&self) -> &'static str {
        "Token mapper"
    }

    fn help_text(&self) -> &'static str {
        "Adds the pairwise subject identifiers other clients receive for this user"
    }

    fn config_properties(&self) -> Vec<ConfigProperty> {
        let mut props = vec![
            ConfigProperty::string(keys::CLAIM_NAME, "Token claim name")
                .with_help("Claim receiving the client-to-pseudonym object; dots nest it")
                .required(),
            ConfigProperty::multivalued(keys::CLIENTS, "Clients")
                .with_help("Clients with a pairwise subject mapper whose pseudonyms are listed"),
        ];
        props.extend(inclusion_properties());
        props
    }

    // Runs after the subject mappers of the owning client.
    fn priority(&self) -> i32 {
        20
    }

    fn validate_config(&self, config: MapperConfig, context: &ValidationContext<'_>) -> OidcResult<MapperConfig> {
        validate_list(&config, context)?;
        Ok(config)
    }
}

impl AccessTokenMapper for PseudonymListMapper {
    fn transform_access_token(
        &self,
        claims: &mut AccessTokenClaims,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<()> {
        apply_list(claims, config, context)
    }
}

impl IdTokenMapper for PseudonymListMapper {
    fn transform_id_token(
        &self,
        claims: &mut IdTokenClaims,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<()> {
        apply_list(claims, config, context)
    }
}

impl UserInfoMapper for PseudonymListMapper {
    fn transform_userinfo(
        &self,
        claims: &mut AccessTokenClaims,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<()> {
        apply_list(claims, config, context)
    }
}
