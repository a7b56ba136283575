#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;

use lemvue_config::{
    Config, ConfigError, Defaults, Profile, load_config_from, profile_to_instance_config,
    save_config_to,
};
use lemvue_core::AuthCredentials;

const SAMPLE: &str = r#"
default_profile = "home"

[defaults]
page_size = 40

[profiles.home]
instance = "https://lemmy.test"
jwt = "token-abc"
timeout = 5

[profiles.guest]
instance = "https://other.test"
"#;

fn write_sample(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    path
}

#[test]
fn file_values_layer_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&write_sample(&dir)).unwrap();

    assert_eq!(config.default_profile.as_deref(), Some("home"));
    assert_eq!(config.defaults.page_size, 40);
    assert_eq!(config.defaults.timeout, 30);
    assert_eq!(config.defaults.start_route, "/");
    assert_eq!(config.profiles.len(), 2);
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn profile_selection_falls_back_to_default_profile() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&write_sample(&dir)).unwrap();

    let (name, profile) = config.profile(None).unwrap();
    assert_eq!(name, "home");
    assert_eq!(profile.instance, "https://lemmy.test");

    let (name, _) = config.profile(Some("guest")).unwrap();
    assert_eq!(name, "guest");

    assert!(matches!(
        config.profile(Some("nope")),
        Err(ConfigError::UnknownProfile(p)) if p == "nope"
    ));
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.profiles.insert(
        "default".into(),
        Profile {
            instance: "https://lemmy.test".into(),
            page_size: Some(15),
            ..Profile::default()
        },
    );
    save_config_to(&config, &path).unwrap();

    assert_eq!(load_config_from(&path).unwrap(), config);
}

#[test]
fn first_inserted_profile_becomes_the_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.insert_profile(
        "home",
        Profile {
            instance: "https://lemmy.test".into(),
            ..Profile::default()
        },
    );
    assert_eq!(config.default_profile.as_deref(), Some("home"));

    config.insert_profile(
        "work",
        Profile {
            instance: "https://lemmy.work".into(),
            ..Profile::default()
        },
    );
    assert_eq!(config.default_profile.as_deref(), Some("home"));

    save_config_to(&config, &path).unwrap();
    let loaded = load_config_from(&path).unwrap();
    let (name, profile) = loaded.profile(None).unwrap();
    assert_eq!(name, "home");
    assert_eq!(profile.instance, "https://lemmy.test");
    assert_eq!(loaded.profiles.len(), 2);
}

#[test]
fn profile_overrides_reach_instance_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&write_sample(&dir)).unwrap();
    let (name, profile) = config.profile(None).unwrap();

    let instance = profile_to_instance_config(profile, name, &config.defaults).unwrap();
    assert_eq!(instance.url.as_str(), "https://lemmy.test/");
    assert_eq!(instance.timeout, Duration::from_secs(5));
    assert_eq!(instance.page_size, 40);
    match instance.auth {
        AuthCredentials::Jwt(jwt) => assert_eq!(jwt.expose_secret(), "token-abc"),
        other => panic!("expected jwt auth, got {other:?}"),
    }
}

#[test]
fn profile_without_account_is_anonymous() {
    let profile = Profile {
        instance: "https://lemmy.test".into(),
        ..Profile::default()
    };
    let instance = profile_to_instance_config(&profile, "guest", &Defaults::default()).unwrap();
    assert!(matches!(instance.auth, AuthCredentials::Anonymous));
    assert_eq!(instance.timeout, Duration::from_secs(30));
}

#[test]
fn invalid_instance_urls_are_rejected() {
    for bad in ["not a url", "ftp://lemmy.test"] {
        let profile = Profile {
            instance: bad.into(),
            ..Profile::default()
        };
        let err = profile_to_instance_config(&profile, "bad", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "instance"));
    }
}

#[test]
fn zero_page_size_is_rejected() {
    let profile = Profile {
        instance: "https://lemmy.test".into(),
        page_size: Some(0),
        ..Profile::default()
    };
    let err = profile_to_instance_config(&profile, "p", &Defaults::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "page_size"));
}
