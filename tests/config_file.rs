//! Configuration loading from disk

use std::io::Write;

use authorizr::api::Apis;
use authorizr::config::{Config, ConfigError};
use authorizr::store::Repo;
use tempfile::NamedTempFile;

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[server]
host = "0.0.0.0"
port = 8080

[logger]
level = "debug"

[[seed.users]]
external_id = "alice@example.com"
path = "/staff/"

[[seed.groups]]
name = "staff"
org = "acme"
members = ["alice@example.com"]
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.logger.level, "debug");

    let apis = Apis::new(Repo::in_memory());
    config.seed.apply(&apis).unwrap();
    let members = apis.groups.list_members("acme", "staff").unwrap();
    assert_eq!(members.users[0].urn, "urn:iws:iam::user/staff/alice@example.com");
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    match Config::from_file(&missing) {
        Err(ConfigError::Io { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected io error, got {:?}", other),
    }
}

#[test]
fn test_seed_referencing_unknown_member_fails() {
    let config = Config::from_toml_str(
        r#"
[[seed.groups]]
name = "staff"
org = "acme"
members = ["ghost"]
"#,
    )
    .unwrap();

    let apis = Apis::new(Repo::in_memory());
    assert!(matches!(config.seed.apply(&apis), Err(ConfigError::Seed(_))));
}
