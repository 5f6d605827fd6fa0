use std::time::Duration;

use assert_matches::assert_matches;

use pocket_decoder::config::{Config, ConfigLoader, DEFAULT_ENDPOINT, PartsEntry};
use pocket_decoder::error::PocketError;

#[test]
fn load_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("pocket-decoder.json");
    std::fs::write(
        &path,
        r#"{
            "endpoint": "http://localhost:9000/process/",
            "timeout_secs": 30,
            "parts": { "structure": "input.pdb" }
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(resolved.client.endpoint, "http://localhost:9000/process/");
    assert_eq!(resolved.client.timeout, Duration::from_secs(30));
    assert_eq!(resolved.decoder.markers.structure, "input.pdb");
    assert_eq!(resolved.decoder.markers.grasp, "grasp.csv");
    assert_eq!(resolved.decoder.expected_content_type, "multipart/form-data");
}

#[test]
fn explicit_missing_file_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");
    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();
    assert_matches!(err, PocketError::ConfigRead(_));
}

#[test]
fn malformed_json_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();
    assert_matches!(err, PocketError::ConfigParse(_));
}

#[test]
fn resolve_defaults_and_validation() {
    let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
    assert_eq!(resolved.client.endpoint, DEFAULT_ENDPOINT);

    let zero_timeout = Config {
        timeout_secs: Some(0),
        ..Config::default()
    };
    assert_matches!(
        ConfigLoader::resolve_config(zero_timeout),
        Err(PocketError::ConfigParse(_))
    );

    let empty_marker = Config {
        parts: Some(PartsEntry {
            grasp: Some(" ".to_string()),
            ..PartsEntry::default()
        }),
        ..Config::default()
    };
    assert_matches!(
        ConfigLoader::resolve_config(empty_marker),
        Err(PocketError::ConfigParse(_))
    );

    let future_schema = Config {
        schema_version: Some(2),
        ..Config::default()
    };
    assert_matches!(
        ConfigLoader::resolve_config(future_schema),
        Err(PocketError::ConfigParse(_))
    );
}
