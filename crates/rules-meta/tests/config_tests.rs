use pretty_assertions::assert_eq;
use rules_fs::ChecksumAlgorithm;
use rules_meta::{ConflictStrategy, Error, RulesServiceConfig};
use std::fs;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
version: "2.0"
agent_folders:
  - path: .cursor/rules
    description: Cursor rules
  - path: .claude/rules/
    description: Claude rules
    enabled: false
sync:
  conflict_strategy: skip
  include_patterns: ["*.rules.md"]
  exclude_patterns: ["draft-*"]
  create_directories: false
  clean_orphaned: false
performance:
  max_parallel_operations: 4
  use_checksums: false
  checksum_algorithm: sha512
"#;

#[test]
fn test_load_full_yaml_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.yaml");
    fs::write(&path, FULL_CONFIG).unwrap();

    let config = RulesServiceConfig::from_file(&path).unwrap();

    assert_eq!(config.version, "2.0");
    assert_eq!(config.agent_folders.len(), 2);
    assert_eq!(config.agent_folders[0].path.as_str(), ".cursor/rules/");
    assert_eq!(config.agent_folders[1].path.as_str(), ".claude/rules/");
    assert_eq!(config.enabled_folders().count(), 1);
    assert_eq!(config.sync.conflict_strategy, ConflictStrategy::Skip);
    assert_eq!(config.sync.exclude_patterns, vec!["draft-*".to_string()]);
    assert!(!config.sync.create_directories);
    assert!(!config.sync.clean_orphaned);
    assert_eq!(config.performance.max_parallel_operations, 4);
    assert!(!config.performance.use_checksums);
    assert_eq!(config.performance.checksum_algorithm, ChecksumAlgorithm::Sha512);
}

#[test]
fn test_minimal_config_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.yml");
    fs::write(&path, "agent_folders:\n  - path: out\n").unwrap();

    let config = RulesServiceConfig::from_file(&path).unwrap();

    assert_eq!(config.version, "1.0");
    assert_eq!(config.sync, Default::default());
    assert_eq!(config.performance, Default::default());
}

#[test]
fn test_legacy_key_aliases() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.yaml");
    fs::write(
        &path,
        "sync:\n  conflict_resolution: ask\n  cleanup_orphaned_files: false\n",
    )
    .unwrap();

    let config = RulesServiceConfig::from_file(&path).unwrap();
    assert_eq!(config.sync.conflict_strategy, ConflictStrategy::Ask);
    assert!(!config.sync.clean_orphaned);
}

#[test]
fn test_toml_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.toml");
    fs::write(
        &path,
        "version = \"1.0\"\n\n[[agent_folders]]\npath = \"out\"\n\n[sync]\nconflict_strategy = \"skip\"\n",
    )
    .unwrap();

    let config = RulesServiceConfig::from_file(&path).unwrap();
    assert_eq!(config.agent_folders[0].path.as_str(), "out/");
    assert_eq!(config.sync.conflict_strategy, ConflictStrategy::Skip);
}

#[test]
fn test_missing_file_is_fatal() {
    let temp = TempDir::new().unwrap();
    let err = RulesServiceConfig::from_file(temp.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound { .. }));
}

#[test]
fn test_malformed_file_is_fatal() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.yaml");
    fs::write(&path, "agent_folders: [unclosed\n").unwrap();

    let err = RulesServiceConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[test]
fn test_unknown_checksum_algorithm_is_invalid() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.yaml");
    fs::write(&path, "performance:\n  checksum_algorithm: md5\n").unwrap();

    let err = RulesServiceConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[test]
fn test_zero_parallelism_is_invalid() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.yaml");
    fs::write(&path, "performance:\n  max_parallel_operations: 0\n").unwrap();

    let err = RulesServiceConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("max_parallel_operations"));
}

#[test]
fn test_discover_falls_back_to_standard_folders() {
    let temp = TempDir::new().unwrap();
    let config = RulesServiceConfig::discover(temp.path()).unwrap();
    assert_eq!(config.agent_folders.len(), 4);

    fs::write(
        temp.path().join(".rules-service.yaml"),
        "agent_folders:\n  - path: only/here\n",
    )
    .unwrap();
    let config = RulesServiceConfig::discover(temp.path()).unwrap();
    assert_eq!(config.agent_folders.len(), 1);
}
