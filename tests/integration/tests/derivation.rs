//! Pseudonym derivation through the subject mappers.

use kc_integration_tests::{SALT, STATIC_SECTOR, TestRealm, USER_ID, static_sector_mapper, simple_sector_mapper, user};
use kc_protocol_oidc::pairwise::keys;
use uuid::Uuid;

#[test]
fn static_sector_subject_matches_known_value() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save("app", static_sector_mapper(STATIC_SECTOR, Some(SALT)))?;

    let token = realm.access_token("app", &user())?;
    assert_eq!(token.sub, "3bb29f6e-f531-3af6-a4f3-3d0d677aec5d");
    Ok(())
}

#[test]
fn other_sector_yields_other_subject() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save("app", static_sector_mapper("http://www.example.de", Some(SALT)))?;

    let token = realm.access_token("app", &user())?;
    assert_eq!(token.sub, "2b590ae3-6e38-303d-9b13-b19047ec188b");
    Ok(())
}

#[test]
fn other_salt_yields_other_subject() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save("app", static_sector_mapper(STATIC_SECTOR, Some("Azhdfopek")))?;

    let token = realm.access_token("app", &user())?;
    assert_eq!(token.sub, "2ee71720-e084-3fe0-babc-f70b337a85de");
    Ok(())
}

#[test]
fn sha3_subject_matches_known_value() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save(
        "app",
        static_sector_mapper(STATIC_SECTOR, Some(SALT)).with_config(keys::ALGORITHM, "HmacSHA3-256"),
    )?;

    let token = realm.access_token("app", &user())?;
    assert_eq!(token.sub, "de284393-b3a2-30e9-856c-409a56a13b4e");
    Ok(())
}

#[test]
fn simple_sector_subject_matches_known_values() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["sha256", "sha512"]);
    realm.save("sha256", simple_sector_mapper("my-sector", "HmacSHA256"))?;
    realm.save("sha512", simple_sector_mapper("my-sector", "HmacSHA512"))?;

    assert_eq!(
        realm.access_token("sha256", &user())?.sub,
        "335b03a2-c24f-3d15-8884-1a8eb54cd981"
    );
    assert_eq!(
        realm.access_token("sha512", &user())?.sub,
        "1620a2f9-9e04-3e92-a91d-1336bb36f47f"
    );
    Ok(())
}

#[test]
fn subject_is_stable_across_tokens_and_surfaces() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save("app", static_sector_mapper(STATIC_SECTOR, None))?;

    let first = realm.access_token("app", &user())?;
    let second = realm.access_token("app", &user())?;
    let id_token = realm.id_token("app", &user())?;
    let userinfo = realm.userinfo("app", &user())?;

    assert_ne!(first.sub, USER_ID);
    assert_eq!(first.sub, second.sub);
    assert_eq!(first.sub, id_token.sub);
    assert_eq!(first.sub, userinfo.sub);
    Ok(())
}

#[test]
fn pseudonym_is_a_name_based_uuid() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save("app", static_sector_mapper(STATIC_SECTOR, None))?;

    let sub = realm.access_token("app", &user())?.sub;
    let parsed = Uuid::parse_str(&sub)?;
    assert_eq!(parsed.get_version_num(), 3);
    assert_eq!(parsed.to_string(), sub);
    Ok(())
}

#[test]
fn distinct_users_get_distinct_subjects() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save("app", static_sector_mapper(STATIC_SECTOR, Some(SALT)))?;

    let other = kc_protocol_oidc::UserInfo::new(Uuid::now_v7(), "bob");
    assert_ne!(
        realm.access_token("app", &user())?.sub,
        realm.access_token("app", &other)?.sub
    );
    Ok(())
}

#[test]
fn attribute_local_identifier() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save(
        "app",
        static_sector_mapper(STATIC_SECTOR, Some(SALT)).with_config(keys::LOCAL_ID_ATTRIBUTE, "employeeNumber"),
    )?;

    let with_attribute = user().with_attribute("employeeNumber", "E-1042");
    let renamed = kc_protocol_oidc::UserInfo::new(Uuid::now_v7(), "alice2")
        .with_attribute("employeeNumber", "E-1042");

    let sub = realm.access_token("app", &with_attribute)?.sub;
    assert_ne!(sub, USER_ID);
    assert_ne!(sub, "3bb29f6e-f531-3af6-a4f3-3d0d677aec5d");
    // The user ID plays no part once an attribute is configured.
    assert_eq!(sub, realm.access_token("app", &renamed)?.sub);
    Ok(())
}

#[test]
fn missing_attribute_leaves_subject_unchanged() -> anyhow::Result<()> {
    let realm = TestRealm::new(&["app"]);
    realm.save(
        "app",
        static_sector_mapper(STATIC_SECTOR, Some(SALT)).with_config(keys::LOCAL_ID_ATTRIBUTE, "employeeNumber"),
    )?;

    let token = realm.access_token("app", &user())?;
    assert_eq!(token.sub, USER_ID);
    Ok(())
}
