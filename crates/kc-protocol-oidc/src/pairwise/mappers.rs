//! The four pairwise pseudonym protocol mappers.
//!
//! | Mapper | Key | Sector | Output |
//! |---|---|---|---|
//! | [`StaticSectorPairwiseMapper`] | salt | static URI | `sub` |
//! | [`SimpleSectorPairwiseMapper`] | sector | simple string | `sub` |
//! | [`PairwiseEmailMapper`] | salt | static URI | `email` |
//! | [`PairwiseClaimMapper`] | sector | simple string | named claim |

use kc_crypto::HmacAlgorithm;
use tracing::debug;

use super::config::{PairwiseMapping, PairwiseVariant, keys, validate_and_normalize};
use crate::claims::{AccessTokenClaims, ClaimSet, IdTokenClaims};
use crate::error::OidcResult;
use crate::mapper::{
    ACCESS_TOKEN_CLAIM, AccessTokenMapper, ConfigProperty, ID_TOKEN_CLAIM, IdTokenMapper,
    MapperConfig, MapperContext, ProtocolMapper, USERINFO_TOKEN_CLAIM, UserInfoMapper,
    ValidationContext,
};

const CATEGORY: &str = "Token mapper";

fn apply_pairwise<C: ClaimSet + ?Sized>(
    variant: PairwiseVariant,
    claims: &mut C,
    config: &MapperConfig,
    context: &MapperContext<'_>,
) -> OidcResult<()> {
    let Some(user) = context.user else {
        debug!(mapper = %config.name, "no user in mapper context; skipping");
        return Ok(());
    };
    PairwiseMapping::from_mapper_config(variant, config)?.apply(claims, user)?;
    Ok(())
}

fn algorithm_property() -> ConfigProperty {
    ConfigProperty::list(
        keys::ALGORITHM,
        "Hash algorithm",
        HmacAlgorithm::names().into_iter().map(str::to_string).collect(),
    )
    .with_default(HmacAlgorithm::DEFAULT.name())
    .with_help("HMAC algorithm used to derive the pseudonym")
}

fn salt_property() -> ConfigProperty {
    ConfigProperty::secret(keys::SALT, "Salt")
        .with_help("Generated on first save when left empty. Cannot be changed afterwards.")
}

fn sector_property(help: &str) -> ConfigProperty {
    ConfigProperty::string(keys::SECTOR_IDENTIFIER, "Sector identifier")
        .with_help(help)
        .required()
}

fn local_id_property() -> ConfigProperty {
    ConfigProperty::string(keys::LOCAL_ID_ATTRIBUTE, "Local identifier attribute")
        .with_default(keys::USER_ID_MARKER)
        .with_help("User attribute fed into the hash; 'id' or empty selects the user ID")
}

pub(crate) fn inclusion_properties() -> [ConfigProperty; 3] {
    [
        ConfigProperty::boolean(ACCESS_TOKEN_CLAIM, "Add to access token").with_default("true"),
        ConfigProperty::boolean(ID_TOKEN_CLAIM, "Add to ID token").with_default("true"),
        ConfigProperty::boolean(USERINFO_TOKEN_CLAIM, "Add to userinfo").with_default("true"),
    ]
}

fn salted_properties() -> Vec<ConfigProperty> {
    vec![
        algorithm_property(),
        salt_property(),
        sector_property("Absolute URI with scheme and host shared by the clients of one sector"),
        local_id_property(),
    ]
}

fn sector_keyed_properties() -> Vec<ConfigProperty> {
    vec![
        algorithm_property(),
        sector_property("Any non-empty string; it keys the hash"),
        local_id_property(),
    ]
}

macro_rules! pairwise_token_mappers {
    ($mapper:ty, $variant:expr) => {
        impl AccessTokenMapper for $mapper {
            fn transform_access_token(
                &self,
                claims: &mut AccessTokenClaims,
                config: &MapperConfig,
                context: &MapperContext<'_>,
            ) -> OidcResult<()> {
                apply_pairwise($variant, claims, config, context)
            }
        }

        impl IdTokenMapper for $mapper {
            fn transform_id_token(
                &self,
                claims: &mut IdTokenClaims,
                config: &MapperConfig,
                context: &MapperContext<'_>,
            ) -> OidcResult<()> {
                apply_pairwise($variant, claims, config, context)
            }
        }

        impl UserInfoMapper for $mapper {
            fn transform_userinfo(
                &self,
                claims: &mut AccessTokenClaims,
                config: &MapperConfig,
                context: &MapperContext<'_>,
            ) -> OidcResult<()> {
                apply_pairwise($variant, claims, config, context)
            }
        }
    };
}

/// Replaces `sub` with a salted pseudonym over a static URI sector.
#[derive(Debug, Clone, Copy)]
pub struct StaticSectorPairwiseMapper;

impl ProtocolMapper for StaticSectorPairwiseMapper {
    fn id(&self) -> &'static str {
        PairwiseVariant::StaticSector.mapper_type()
    }

    fn display_name(&self) -> &'static str {
        "Pairwise subject identifier (HMAC)"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn help_text(&self) -> &'static str {
        "Replaces the subject with a salted HMAC pseudonym per sector"
    }

    fn config_properties(&self) -> Vec<ConfigProperty> {
        let mut props = salted_properties();
        props.extend(inclusion_properties());
        props
    }

    fn validate_config(&self, config: MapperConfig, context: &ValidationContext<'_>) -> OidcResult<MapperConfig> {
        Ok(validate_and_normalize(config, PairwiseVariant::StaticSector, context.settings)?)
    }
}

pairwise_token_mappers!(StaticSectorPairwiseMapper, PairwiseVariant::StaticSector);

/// Replaces `sub` with a pseudonym keyed by an opaque sector string.
#[derive(Debug, Clone, Copy)]
pub struct SimpleSectorPairwiseMapper;

impl ProtocolMapper for SimpleSectorPairwiseMapper {
    fn id(&self) -> &'static str {
        PairwiseVariant::SimpleSector.mapper_type()
    }

    fn display_name(&self) -> &'static str {
        "Pairwise subject identifier (simple sector)"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn help_text(&self) -> &'static str {
        "Replaces the subject with an HMAC pseudonym keyed by the sector identifier"
    }

    fn config_properties(&self) -> Vec<ConfigProperty> {
        let mut props = sector_keyed_properties();
        props.extend(inclusion_properties());
        props
    }

    fn validate_config(&self, config: MapperConfig, context: &ValidationContext<'_>) -> OidcResult<MapperConfig> {
        Ok(validate_and_normalize(config, PairwiseVariant::SimpleSector, context.settings)?)
    }
}

pairwise_token_mappers!(SimpleSectorPairwiseMapper, PairwiseVariant::SimpleSector);

/// Replaces `email` with `pseudonym@domain`.
///
/// The domain is the configured one, or else the domain of the email
/// claim being replaced. Without either the claim is left alone.
#[derive(Debug, Clone, Copy)]
pub struct PairwiseEmailMapper;

impl ProtocolMapper for PairwiseEmailMapper {
    fn id(&self) -> &'static str {
        PairwiseVariant::Email.mapper_type()
    }

    fn display_name(&self) -> &'static str {
        "Pairwise email (HMAC)"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn help_text(&self) -> &'static str {
        "Replaces the email address with a salted HMAC pseudonym at a fixed or the original domain"
    }

    fn config_properties(&self) -> Vec<ConfigProperty> {
        let mut props = salted_properties();
        props.push(
            ConfigProperty::string(keys::EMAIL_DOMAIN, "Email domain")
                .with_help("Domain of the pseudonymous address; empty keeps the user's domain"),
        );
        props.extend(inclusion_properties());
        props
    }

    // Runs after the mappers that populate the email claim.
    fn priority(&self) -> i32 {
        10
    }

    fn validate_config(&self, config: MapperConfig, context: &ValidationContext<'_>) -> OidcResult<MapperConfig> {
        Ok(validate_and_normalize(config, PairwiseVariant::Email, context.settings)?)
    }
}

pairwise_token_mappers!(PairwiseEmailMapper, PairwiseVariant::Email);

/// Writes a sector-keyed pseudonym into a custom claim, leaving `sub`
/// untouched.
#[derive(Debug, Clone, Copy)]
pub struct PairwiseClaimMapper;

impl ProtocolMapper for PairwiseClaimMapper {
    fn id(&self) -> &'static str {
        PairwiseVariant::NamedClaim.mapper_type()
    }

    fn display_name(&self) -> &'static str {
        "Pairwise claim (HMAC)"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn config_properties(&self) -> Vec<ConfigProperty> {
        let mut props = sector_keyed_properties();
        props.push(
            ConfigProperty::string(keys::CLAIM_NAME, "Token claim name")
                .with_help("Claim receiving the pseudonym; dots create nested objects")
                .required(),
        );
        props.extend(inclusion_properties());
        props
    }

    fn validate_config(&self, config: MapperConfig, context: &ValidationContext<'_>) -> OidcResult<MapperConfig> {
        Ok(validate_and_normalize(config, PairwiseVariant::NamedClaim, context.settings)?)
    }
}

pairwise_token_mappers!(PairwiseClaimMapper, PairwiseVariant::NamedClaim);
