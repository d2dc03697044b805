//! Pseudonym lists: one client's token carrying other clients' subjects.

use kc_integration_tests::{
    SALT, STATIC_SECTOR, TestRealm, list_mapper, static_sector_mapper, user,
};
use kc_protocol_oidc::pairwise::{PairwiseError, PairwiseVariant, keys};
use kc_protocol_oidc::{MapperConfig, MapperOwner, OidcError};
use serde_json::json;

const CLAIM: &str = "pairwise_ids";

/// Clients `a` and `b` with subject mappers, `portal` for the list.
fn realm() -> anyhow::Result<TestRealm> {
    let realm = TestRealm::new(&["a", "b", "portal"]);
    realm.save("a", static_sector_mapper(STATIC_SECTOR, Some(SALT)))?;
    realm.save("b", static_sector_mapper("http://www.example.de", Some(SALT)))?;
    Ok(realm)
}

#[test]
fn list_carries_each_clients_subject() -> anyhow::Result<()> {
    let realm = realm()?;
    realm.save("portal", list_mapper(CLAIM, &["a", "b"]))?;

    let token = realm.access_token("portal", &user())?;
    assert_eq!(
        token.additional.get(CLAIM),
        Some(&json!({
            "a": "3bb29f6e-f531-3af6-a4f3-3d0d677aec5d",
            "b": "2b590ae3-6e38-303d-9b13-b19047ec188b",
        }))
    );
    Ok(())
}

#[test]
fn listed_pseudonyms_equal_what_each_client_receives() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["a", "b", "portal"]);
    realm.save("a", static_sector_mapper(STATIC_SECTOR, None))?;
    realm.save("b", static_sector_mapper(STATIC_SECTOR, None))?;
    realm.save("portal", list_mapper(CLAIM, &["a", "b"]))?;

    let user = user();
    let list = realm.id_token("portal", &user)?;
    let ids = list.additional.get(CLAIM).cloned().unwrap_or_default();

    let a = realm.id_token("a", &user)?.sub;
    let b = realm.id_token("b", &user)?.sub;
    assert_eq!(ids["a"], json!(a));
    assert_eq!(ids["b"], json!(b));
    // Generated salts differ, so equal sectors still give distinct subjects.
    assert_ne!(a, b);
    Ok(())
}

#[test]
fn list_does_not_touch_own_subject() -> anyhow::Result<()> {
    let realm = realm()?;
    realm.save("portal", list_mapper(CLAIM, &["a"]))?;

    let user = user();
    assert_eq!(realm.access_token("portal", &user)?.sub, user.id.to_string());
    Ok(())
}

#[test]
fn unknown_client_is_rejected_at_save() -> anyhow::Result<()> {
    let realm = realm()?;

    let error = match realm.save("portal", list_mapper(CLAIM, &["a", "nonexistent"])) {
        Err(OidcError::Mapper(error)) => error,
        other => panic!("expected a mapper error, got {other:?}"),
    };
    assert_eq!(error, PairwiseError::ClientDoesNotExist("nonexistent".to_string()));
    assert_eq!(error.message_key(), "pairwiseClientDoesNotExist");
    assert_eq!(error.parameters(), vec!["nonexistent".to_string()]);
    assert!(realm.store.list(&MapperOwner::Client("portal".to_string())).is_empty());
    Ok(())
}

#[test]
fn client_without_subject_mapper_is_rejected_at_save() -> anyhow::Result<()> {
    let realm = realm()?;
    let result = realm.save("portal", list_mapper(CLAIM, &["portal"]));
    assert!(matches!(
        result,
        Err(OidcError::Mapper(PairwiseError::ClientDoesNotExist(id))) if id == "portal"
    ));
    Ok(())
}

#[test]
fn list_requires_claim_name() -> anyhow::Result<()> {
    let realm = realm()?;
    let result = realm.save("portal", list_mapper("", &["a"]));
    assert!(matches!(
        result,
        Err(OidcError::Mapper(PairwiseError::TargetClaimNotSet))
    ));
    Ok(())
}

#[test]
fn list_is_client_scoped() -> anyhow::Result<()> {
    let realm = realm()?;
    let result = realm.store.save(&MapperOwner::Realm, list_mapper(CLAIM, &["a"]));
    assert!(matches!(
        result,
        Err(OidcError::Mapper(PairwiseError::WrongMapperType))
    ));
    Ok(())
}

#[test]
fn deleted_client_is_skipped_at_issuance() -> anyhow::Result<()> {
    let realm = realm()?;
    realm.save("portal", list_mapper(CLAIM, &["a", "b"]))?;
    assert_eq!(realm.store.delete_client("b"), Some(1));

    let token = realm.access_token("portal", &user())?;
    assert_eq!(
        token.additional.get(CLAIM),
        Some(&json!({ "a": "3bb29f6e-f531-3af6-a4f3-3d0d677aec5d" }))
    );
    Ok(())
}

#[test]
fn client_with_absent_local_identifier_is_skipped() -> anyhow::Result<()> {
    let realm = realm()?;
    let stored = realm.store.list(&MapperOwner::Client("b".to_string())).remove(0);
    realm.save("b", stored.with_config(keys::LOCAL_ID_ATTRIBUTE, "employeeNumber"))?;
    realm.save("portal", list_mapper(CLAIM, &["a", "b"]))?;

    let ids = realm.access_token("portal", &user())?.additional[CLAIM].clone();
    assert!(ids.get("a").is_some());
    assert!(ids.get("b").is_none());
    Ok(())
}

#[test]
fn list_merges_into_existing_object_claim() -> anyhow::Result<()> {
    let realm = realm()?;
    let own = MapperConfig::new("own pseudonym", PairwiseVariant::NamedClaim.mapper_type())
        .with_config(keys::SECTOR_IDENTIFIER, "portal-sector")
        .with_config(keys::CLAIM_NAME, format!("{CLAIM}.portal"));
    realm.save("portal", list_mapper(CLAIM, &["a"]))?;
    realm.save("portal", own)?;

    let ids = realm.userinfo("portal", &user())?.additional[CLAIM].clone();
    let ids = ids.as_object().cloned().unwrap_or_default();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains_key("portal"));
    assert_eq!(ids["a"], json!("3bb29f6e-f531-3af6-a4f3-3d0d677aec5d"));
    Ok(())
}
