use procon_gardener::load_config::{
    default_config_path, init_config, load_config, resolve_config_path,
};
use procon_gardener_core::config::DEFAULT_BASE_URL;
use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::{Builder, NamedTempFile, TempDir};

#[test]
fn test_load_config_json() {
    let config_json = r#"{
	"atcoder": {
		"repository_path": "/srv/atcoder-archive",
		"user_id": "gardener",
		"user_email": "gardener@example.com",
		"contests": ["abc040", "arc100"]
	}
}"#;
    let config_file = Builder::new().suffix(".json").tempfile().expect("temp file");
    write(config_file.path(), config_json).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");
    assert_eq!(config.atcoder.repository_path, PathBuf::from("/srv/atcoder-archive"));
    assert_eq!(config.atcoder.user_id, "gardener");
    assert_eq!(config.atcoder.user_email, "gardener@example.com");
    assert_eq!(config.atcoder.contests, vec!["abc040", "arc100"]);
    assert_eq!(config.atcoder.base_url, DEFAULT_BASE_URL);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_config_yaml() {
    let config_yaml = r#"
atcoder:
  repository_path: /srv/atcoder-archive
  user_id: gardener
  user_email: gardener@example.com
  base_url: http://localhost:8080
  contests:
    - abc040
"#;
    let config_file = Builder::new().suffix(".yaml").tempfile().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("YAML config should load");
    assert_eq!(config.atcoder.contests, vec!["abc040"]);
    assert_eq!(config.atcoder.base_url, "http://localhost:8080");
}

#[test]
fn test_load_config_without_contests_uses_defaults() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(
        config_file.path(),
        r#"{"atcoder":{
            "repository_path":"/srv/a",
            "user_id":"gardener",
            "user_email":"g@example.com"
        }}"#,
    )
    .unwrap();

    let config = load_config(config_file.path()).expect("Loader should allow missing contests");
    assert!(config.atcoder.contests.is_empty());
    assert_eq!(config.atcoder.base_url, DEFAULT_BASE_URL);
}

#[test]
fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"{\"atcoder\": [:::").unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("parse"), "Parse error expected, got: {msg}");
}

#[test]
fn test_load_config_errors_for_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = load_config(dir.path().join("nope.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"), "got: {err}");
}

#[test]
fn test_init_config_round_trips_through_loader() {
    let dir = TempDir::new().unwrap();
    for name in ["config.json", "config.yml"] {
        let path = dir.path().join("nested").join(name);
        assert!(init_config(&path, false).unwrap());
        assert!(!init_config(&path, false).unwrap(), "second init must not overwrite");

        let config = load_config(&path).expect("blank config should load");
        assert!(config.validate().is_err(), "blank config is incomplete");
        assert_eq!(config.atcoder.base_url, DEFAULT_BASE_URL);
    }
}

#[cfg(unix)]
#[test]
#[serial]
fn test_repository_path_tilde_is_expanded() {
    let home = TempDir::new().unwrap();
    let old_home = env::var_os("HOME");
    env::set_var("HOME", home.path());

    let config_file = NamedTempFile::new().expect("temp file");
    write(
        config_file.path(),
        r#"{"atcoder":{"repository_path":"~/atcoder","user_id":"gardener"}}"#,
    )
    .unwrap();
    let config = load_config(config_file.path());

    match old_home {
        Some(h) => env::set_var("HOME", h),
        None => env::remove_var("HOME"),
    }
    assert_eq!(config.unwrap().atcoder.repository_path, home.path().join("atcoder"));
}

#[cfg(unix)]
#[test]
#[serial]
fn test_default_config_path_is_under_home() {
    let home = TempDir::new().unwrap();
    let old_home = env::var_os("HOME");
    env::set_var("HOME", home.path());

    let default = default_config_path();
    let explicit = resolve_config_path(Some(PathBuf::from("/etc/gardener.json")));

    match old_home {
        Some(h) => env::set_var("HOME", h),
        None => env::remove_var("HOME"),
    }
    assert_eq!(
        default.unwrap(),
        home.path().join(".procon-gardener").join("config.json")
    );
    assert_eq!(explicit.unwrap(), PathBuf::from("/etc/gardener.json"));
}
