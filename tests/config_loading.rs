// ==============================================
// CONFIG LOADING TESTS (integration)
// ==============================================
//
// Config::load against real files, and wiring a loaded config into the
// engine and ring.

use std::fs;

use groupcache::{Config, ConfigError, Engine, HashRing};
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load(dir.path().join("absent.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn file_overrides_are_applied() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "cache": { "maxBytes": 4096 },
            "hash": { "replicas": 7 },
            "http": { "address": "127.0.0.1", "port": 8001 }
        }"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.cache.max_bytes, 4096);
    assert_eq!(config.hash.replicas, 7);

    let engine = Engine::new();
    let group = engine.add_group_with_config("g", None, &config);
    assert_eq!(group.capacity_bytes(), 4096);

    let mut ring = HashRing::from_config(&config);
    ring.add_peers(["a", "b"]);
    assert_eq!(ring.replicas(), 7);
    assert_eq!(ring.peers(), vec!["a", "b"]);
}

#[test]
fn malformed_file_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn invalid_values_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "hash": { "replicas": 0 } }"#).unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn directory_path_is_io_error() {
    let dir = tempdir().unwrap();
    let err = Config::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
