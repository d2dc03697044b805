//! Admin save path: normalization and rejection of mapper configurations.

use kc_integration_tests::{SALT, STATIC_SECTOR, TestRealm, simple_sector_mapper, static_sector_mapper, user};
use kc_protocol_oidc::pairwise::{PairwiseError, PairwiseVariant, keys};
use kc_protocol_oidc::{MapperConfig, MapperOwner, OidcError};

fn pairwise_error(result: Result<MapperConfig, OidcError>) -> PairwiseError {
    match result {
        Err(OidcError::Mapper(e)) => e,
        other => panic!("expected a pairwise error, got {other:?}"),
    }
}

#[test]
fn save_generates_salt_once() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);

    let saved = realm.save("app", static_sector_mapper(STATIC_SECTOR, None))?;
    let salt = saved.get_non_blank(keys::SALT).map(str::to_string);
    assert!(salt.is_some());

    // Re-saving without a salt must not rotate it.
    let mut resubmitted = saved.clone();
    resubmitted.config.remove(keys::SALT);
    let resaved = realm.save("app", resubmitted)?;
    assert_eq!(resaved.get(keys::SALT).map(str::to_string), salt);

    // Neither may an explicit different salt.
    let resaved = realm.save("app", saved.clone().with_config(keys::SALT, "rotated-salt"))?;
    assert_eq!(resaved.get(keys::SALT).map(str::to_string), salt);
    Ok(())
}

#[test]
fn subject_survives_resave() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    let saved = realm.save("app", static_sector_mapper(STATIC_SECTOR, None))?;
    let before = realm.access_token("app", &user())?.sub;

    realm.save("app", saved.with_config(keys::SALT, ""))?;
    assert_eq!(realm.access_token("app", &user())?.sub, before);
    Ok(())
}

#[test]
fn provided_salt_is_kept() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    let saved = realm.save("app", static_sector_mapper(STATIC_SECTOR, Some(SALT)))?;
    assert_eq!(saved.get(keys::SALT), Some(SALT));
    Ok(())
}

#[test]
fn algorithm_is_defaulted_and_canonicalized() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);

    let defaulted = realm.save("app", static_sector_mapper(STATIC_SECTOR, None))?;
    assert_eq!(defaulted.get(keys::ALGORITHM), Some("HmacSHA256"));

    let lowercase = realm.save(
        "app",
        static_sector_mapper(STATIC_SECTOR, None).with_config(keys::ALGORITHM, "hmacsha3-512"),
    )?;
    assert_eq!(lowercase.get(keys::ALGORITHM), Some("HmacSHA3-512"));
    Ok(())
}

#[test]
fn unknown_algorithm_is_rejected() {
    let realm = TestRealm::new(&["app"]);
    let error = pairwise_error(realm.save(
        "app",
        static_sector_mapper(STATIC_SECTOR, None).with_config(keys::ALGORITHM, "HmacWhirlpool"),
    ));
    assert_eq!(error, PairwiseError::UnknownAlgorithm("HmacWhirlpool".to_string()));
    assert_eq!(error.message_key(), "pairwiseUnknownAlgorithm");
}

#[test]
fn static_sector_requires_absolute_uri() {
    let realm = TestRealm::new(&["app"]);

    let error = pairwise_error(realm.save("app", static_sector_mapper("invalidSectorIdentifier", None)));
    assert_eq!(
        error,
        PairwiseError::MalformedSectorIdentifier("invalidSectorIdentifier".to_string())
    );
    assert_eq!(error.parameters(), vec!["invalidSectorIdentifier".to_string()]);

    let error = pairwise_error(realm.save("app", static_sector_mapper("http://host/q?s=^IXIC", None)));
    assert_eq!(error.message_key(), "pairwiseMalformedSectorIdentifier");

    let error = pairwise_error(realm.save("app", static_sector_mapper("  ", None)));
    assert_eq!(error, PairwiseError::MissingSectorIdentifier);

    assert!(realm.store.list(&MapperOwner::Client("app".to_string())).is_empty());
}

#[test]
fn simple_sector_accepts_any_non_blank_value() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    let saved = realm.save("app", simple_sector_mapper("my-sector", "HmacSHA256"))?;
    assert!(saved.get(keys::SALT).is_none());

    let error = pairwise_error(realm.save("app", simple_sector_mapper("", "HmacSHA256")));
    assert_eq!(error, PairwiseError::MissingSectorIdentifier);
    Ok(())
}

#[test]
fn named_claim_requires_target() {
    let realm = TestRealm::new(&["app"]);
    let config = MapperConfig::new("pairwise claim", PairwiseVariant::NamedClaim.mapper_type())
        .with_config(keys::SECTOR_IDENTIFIER, "my-sector");

    let error = pairwise_error(realm.save("app", config));
    assert_eq!(error, PairwiseError::TargetClaimNotSet);
    assert!(error.is_config_error());
}

#[test]
fn unknown_mapper_type_is_rejected() {
    let realm = TestRealm::new(&["app"]);
    let result = realm.save("app", MapperConfig::new("x", "oidc-unknown-mapper"));
    assert!(matches!(result, Err(OidcError::InvalidRequest(_))));
}

#[test]
fn missing_client_is_rejected() {
    let realm = TestRealm::new(&[]);
    let result = realm.save("ghost", static_sector_mapper(STATIC_SECTOR, None));
    assert!(matches!(result, Err(OidcError::InvalidRequest(_))));
}

#[test]
fn rejected_save_is_a_bad_request() {
    let realm = TestRealm::new(&["app"]);
    let error = realm
        .save("app", static_sector_mapper("invalidSectorIdentifier", None))
        .unwrap_err();

    assert_eq!(error.http_status(), 400);
    let response = error.to_error_response();
    assert_eq!(response.error, "invalid_request");
    assert_eq!(
        response.error_description.as_deref(),
        Some("pairwiseMalformedSectorIdentifier")
    );
}

#[test]
fn padded_salt_keys_the_mac_verbatim() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["trimmed", "padded"]);
    realm.save("trimmed", static_sector_mapper(STATIC_SECTOR, Some(SALT)))?;
    let salt = format!(" {SALT} ");
    let padded = realm.save("padded", static_sector_mapper(STATIC_SECTOR, Some(&salt)))?;
    assert_eq!(padded.get(keys::SALT), Some(salt.as_str()));

    let user = user();
    assert_ne!(
        realm.access_token("padded", &user)?.sub,
        realm.access_token("trimmed", &user)?.sub
    );
    Ok(())
}
