//! Registry application across access token, ID token and userinfo.

use kc_integration_tests::{SALT, STATIC_SECTOR, TestRealm, USER_ID, static_sector_mapper, user};
use kc_protocol_oidc::mapper::{ACCESS_TOKEN_CLAIM, ID_TOKEN_CLAIM, USERINFO_TOKEN_CLAIM};
use kc_protocol_oidc::pairwise::{PairwiseError, PairwiseVariant, keys};
use kc_protocol_oidc::{
    AccessTokenClaims, MapperConfig, MapperContext, ProtocolMapperRegistry, UserInfo,
};
use serde_json::json;

const SUBJECT: &str = "3bb29f6e-f531-3af6-a4f3-3d0d677aec5d";

fn email_mapper() -> MapperConfig {
    MapperConfig::new("pairwise email", PairwiseVariant::Email.mapper_type())
        .with_config(keys::SECTOR_IDENTIFIER, STATIC_SECTOR)
        .with_config(keys::SALT, SALT)
}

#[test]
fn inclusion_flags_select_surfaces() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save(
        "app",
        static_sector_mapper(STATIC_SECTOR, Some(SALT))
            .with_config(ACCESS_TOKEN_CLAIM, "true")
            .with_config(ID_TOKEN_CLAIM, "false")
            .with_config(USERINFO_TOKEN_CLAIM, "false"),
    )?;

    let user = user();
    assert_eq!(realm.access_token("app", &user)?.sub, SUBJECT);
    assert_eq!(realm.id_token("app", &user)?.sub, USER_ID);
    assert_eq!(realm.userinfo("app", &user)?.sub, USER_ID);
    Ok(())
}

#[test]
fn email_mapper_keeps_user_domain() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save("app", email_mapper())?;

    let token = realm.access_token("app", &user())?;
    assert_eq!(token.email.as_deref(), Some(format!("{SUBJECT}@example.org").as_str()));
    assert_eq!(token.sub, USER_ID);

    // ID tokens start without an email claim; the user's address supplies the domain.
    let id_token = realm.id_token("app", &user())?;
    assert_eq!(id_token.email, Some(format!("{SUBJECT}@example.org")));
    Ok(())
}

#[test]
fn email_mapper_uses_configured_domain() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save("app", email_mapper().with_config(keys::EMAIL_DOMAIN, "@relay.example.net"))?;

    let token = realm.userinfo("app", &user())?;
    assert_eq!(token.email, Some(format!("{SUBJECT}@relay.example.net")));
    Ok(())
}

#[test]
fn email_mapper_skips_without_domain() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save("app", email_mapper())?;

    let user = UserInfo::new(uuid::Uuid::parse_str(USER_ID)?, "alice");
    let token = realm.access_token("app", &user)?;
    assert_eq!(token.email, None);
    Ok(())
}

#[test]
fn named_claim_writes_nested_path() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save(
        "app",
        MapperConfig::new("pairwise claim", PairwiseVariant::NamedClaim.mapper_type())
            .with_config(keys::SECTOR_IDENTIFIER, "my-sector")
            .with_config(keys::CLAIM_NAME, "pseudonyms.app"),
    )?;

    let token = realm.id_token("app", &user())?;
    let value = &token.additional["pseudonyms"]["app"];
    assert!(value.is_string());
    assert_ne!(value, &json!(USER_ID));
    assert_eq!(token.sub, USER_ID);
    Ok(())
}

#[test]
fn subject_and_email_mappers_compose() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save("app", static_sector_mapper(STATIC_SECTOR, Some(SALT)))?;
    realm.save("app", email_mapper())?;

    let token = realm.access_token("app", &user())?;
    assert_eq!(token.sub, SUBJECT);
    assert_eq!(token.email, Some(format!("{SUBJECT}@example.org")));
    Ok(())
}

#[test]
fn context_without_user_leaves_claims_unchanged() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    let saved = realm.save("app", static_sector_mapper(STATIC_SECTOR, Some(SALT)))?;

    let registry = ProtocolMapperRegistry::with_pairwise_mappers();
    let mut claims = AccessTokenClaims::new(
        "https://sso.example.com/realms/test".to_string(),
        "service-account".to_string(),
        chrono::Utc::now() + chrono::Duration::minutes(5),
    );
    let context = MapperContext::new("test", &[]);
    registry.apply_access_token_mappers(&mut claims, &[saved], &context)?;

    assert_eq!(claims.sub, "service-account");
    Ok(())
}

#[test]
fn unsalted_configuration_fails_issuance() {
    let registry = ProtocolMapperRegistry::with_pairwise_mappers();
    let config = static_sector_mapper(STATIC_SECTOR, None);
    let user = user();
    let mut claims = AccessTokenClaims::new(
        "https://sso.example.com/realms/test".to_string(),
        USER_ID.to_string(),
        chrono::Utc::now() + chrono::Duration::minutes(5),
    );
    let context = MapperContext::new("test", &[]).with_user(&user);

    let error = registry
        .apply_access_token_mappers(&mut claims, &[config], &context)
        .unwrap_err();
    assert!(error.as_mapper_error().is_some_and(|e| e.is_fatal()));
    assert_eq!(error.to_error_response().error, "server_error");
    assert_eq!(claims.sub, USER_ID);
}

#[test]
fn algorithm_missing_at_issuance_fails_issuance() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    let saved = realm.save("app", static_sector_mapper(STATIC_SECTOR, Some(SALT)))?;
    // Stored before the runtime lost the algorithm.
    let stale = saved.with_config(keys::ALGORITHM, "HmacWhirlpool");

    let registry = ProtocolMapperRegistry::with_pairwise_mappers();
    let user = user();
    let mut claims = AccessTokenClaims::new(
        "https://sso.example.com/realms/test".to_string(),
        USER_ID.to_string(),
        chrono::Utc::now() + chrono::Duration::minutes(5),
    );
    let context = MapperContext::new("test", &[]).with_user(&user);

    let error = registry
        .apply_access_token_mappers(&mut claims, &[stale], &context)
        .unwrap_err();
    let mapper_error = error.as_mapper_error();
    assert_eq!(
        mapper_error,
        Some(&PairwiseError::UnresolvableAlgorithm("HmacWhirlpool".to_string()))
    );
    assert!(mapper_error.is_some_and(PairwiseError::is_fatal));
    assert_eq!(error.http_status(), 500);
    assert_eq!(error.to_error_response().error, "server_error");
    assert_eq!(claims.sub, USER_ID);
    Ok(())
}
