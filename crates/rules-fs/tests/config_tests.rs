use pretty_assertions::assert_eq;
use rules_fs::{ConfigStore, NormalizedPath};
use rstest::rstest;
use serde::Deserialize;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize, PartialEq)]
struct Sample {
    name: String,
    count: i32,
}

#[rstest]
#[case("config.toml", "name = \"test\"\ncount = 42\n")]
#[case("config.json", r#"{"name": "test", "count": 42}"#)]
#[case("config.yaml", "name: test\ncount: 42\n")]
#[case("config.yml", "name: test\ncount: 42\n")]
fn test_load_by_extension(#[case] file: &str, #[case] content: &str) {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join(file);
    fs::write(&file_path, content).unwrap();

    let loaded: Sample = ConfigStore::new().load(&NormalizedPath::new(&file_path)).unwrap();

    assert_eq!(
        loaded,
        Sample {
            name: "test".into(),
            count: 42
        }
    );
}

#[test]
fn test_parse_error_names_format() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("broken.yaml");
    fs::write(&file_path, "name: [unclosed\n").unwrap();

    let err = ConfigStore::new()
        .load::<Sample>(&NormalizedPath::new(&file_path))
        .unwrap_err();

    match err {
        rules_fs::Error::ConfigParse { format, .. } => assert_eq!(format, "YAML"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("config.ini");
    fs::write(&file_path, "name=test").unwrap();

    let err = ConfigStore::new()
        .load::<Sample>(&NormalizedPath::new(&file_path))
        .unwrap_err();
    assert!(matches!(err, rules_fs::Error::UnsupportedFormat { .. }));
}
