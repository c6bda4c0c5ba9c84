//! Rules service configuration
//!
//! Loaded from `.rules-service.yaml` (or a TOML/JSON equivalent). Example:
//!
//! ```yaml
//! version: "1.0"
//! agent_folders:
//!   - path: .cursor/rules
//!     description: Cursor rules
//! sync:
//!   conflict_strategy: skip
//!   clean_orphaned: false
//! performance:
//!   max_parallel_operations: 4
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rules_fs::{CONFIG_FILE_NAME, ChecksumAlgorithm, ConfigStore, NormalizedPath, RULES_GLOB};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::{Error, Result};

/// What to do when a target file differs from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    #[default]
    Overwrite,
    Skip,
    /// Unattended runs treat this as `Skip`.
    Ask,
}

impl FromStr for ConflictStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "skip" => Ok(Self::Skip),
            "ask" => Ok(Self::Ask),
            _ => Err(Error::UnknownVariant {
                kind: "conflict strategy",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::Skip => write!(f, "skip"),
            Self::Ask => write!(f, "ask"),
        }
    }
}

/// A directory that mirrors the rule corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFolder {
    /// Relative to the repository root; always ends with `/`.
    #[serde(deserialize_with = "deserialize_dir")]
    pub path: NormalizedPath,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl AgentFolder {
    pub fn new(path: impl AsRef<Path>, description: impl Into<String>) -> Self {
        Self {
            path: NormalizedPath::new(path).as_dir(),
            description: description.into(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

fn deserialize_dir<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<NormalizedPath, D::Error> {
    NormalizedPath::deserialize(deserializer).map(|p| p.as_dir())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default, alias = "conflict_resolution")]
    pub conflict_strategy: ConflictStrategy,
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default = "default_true")]
    pub create_directories: bool,
    #[serde(default = "default_true", alias = "cleanup_orphaned_files")]
    pub clean_orphaned: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            conflict_strategy: ConflictStrategy::default(),
            include_patterns: default_include_patterns(),
            exclude_patterns: Vec::new(),
            create_directories: true,
            clean_orphaned: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    #[serde(default = "default_max_parallel")]
    pub max_parallel_operations: usize,
    /// When false, sync compares file sizes instead of hashes.
    #[serde(default = "default_true")]
    pub use_checksums: bool,
    #[serde(default)]
    pub checksum_algorithm: ChecksumAlgorithm,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_parallel_operations: default_max_parallel(),
            use_checksums: true,
            checksum_algorithm: ChecksumAlgorithm::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_include_patterns() -> Vec<String> {
    vec![RULES_GLOB.to_string()]
}

fn default_max_parallel() -> usize {
    10
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Top-level rules service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesServiceConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub agent_folders: Vec<AgentFolder>,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

impl Default for RulesServiceConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            agent_folders: Vec::new(),
            sync: SyncConfig::default(),
            performance: PerformanceConfig::default(),
        }
    }
}

impl RulesServiceConfig {
    /// Defaults plus the conventional editor/agent rule folders.
    pub fn with_standard_folders() -> Self {
        Self {
            agent_folders: vec![
                AgentFolder::new(".cursor/rules", "Cursor rules"),
                AgentFolder::new(".vscode/rules", "VS Code rules"),
                AgentFolder::new(".cline/rules", "Cline rules"),
                AgentFolder::new(".claude/rules", "Claude rules"),
            ],
            ..Self::default()
        }
    }

    /// Load an explicitly named configuration file.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigNotFound`] when the file does not exist and
    /// [`Error::InvalidConfig`] when it cannot be parsed or fails validation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let native = path.as_ref();
        let normalized = NormalizedPath::new(native);
        if !normalized.is_file() {
            return Err(Error::ConfigNotFound {
                path: native.to_path_buf(),
            });
        }

        let config: Self = ConfigStore::new().load(&normalized).map_err(|e| match e {
            rules_fs::Error::ConfigParse { message, .. } => Error::InvalidConfig {
                path: native.to_path_buf(),
                message,
            },
            rules_fs::Error::UnsupportedFormat { extension } => Error::InvalidConfig {
                path: native.to_path_buf(),
                message: format!("unsupported config format '{extension}'"),
            },
            other => Error::Fs(other),
        })?;

        config.check().map_err(|message| Error::InvalidConfig {
            path: native.to_path_buf(),
            message,
        })?;
        tracing::debug!(path = %normalized, folders = config.agent_folders.len(), "loaded rules service config");
        Ok(config)
    }

    /// Load `<root>/.rules-service.yaml` if present, else the standard defaults.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self> {
        let candidate = root.as_ref().join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::from_file(candidate)
        } else {
            Ok(Self::with_standard_folders())
        }
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.performance.max_parallel_operations == 0 {
            return Err("performance.max_parallel_operations must be at least 1".into());
        }
        Ok(())
    }

    pub fn enabled_folders(&self) -> impl Iterator<Item = &AgentFolder> {
        self.agent_folders.iter().filter(|f| f.enabled)
    }

    /// A copy of this config with dotted-key overrides applied, e.g.
    /// `("sync.conflict_strategy", "skip")`.
    pub fn merge_with_overrides(&self, overrides: &[(&str, Value)]) -> Result<Self> {
        let mut tree = serde_yaml::to_value(self).map_err(|e| Error::InvalidOverride {
            key: String::new(),
            message: e.to_string(),
        })?;

        for (key, value) in overrides {
            set_dotted(&mut tree, key, value.clone())?;
        }

        let merged: Self = serde_yaml::from_value(tree).map_err(|e| Error::InvalidOverride {
            key: overrides
                .iter()
                .map(|(k, _)| *k)
                .collect::<Vec<_>>()
                .join(", "),
            message: e.to_string(),
        })?;
        merged.check().map_err(|message| Error::InvalidOverride {
            key: "performance.max_parallel_operations".into(),
            message,
        })?;
        Ok(merged)
    }
}

fn set_dotted(tree: &mut Value, key: &str, value: Value) -> Result<()> {
    let unknown = || Error::InvalidOverride {
        key: key.to_string(),
        message: "unknown configuration key".into(),
    };

    let mut node = tree;
    let mut segments = key.split('.').peekable();
    while let Some(segment) = segments.next() {
        let map = node.as_mapping_mut().ok_or_else(unknown)?;
        let slot = map.get_mut(segment).ok_or_else(unknown)?;
        if segments.peek().is_none() {
            *slot = value;
            return Ok(());
        }
        node = slot;
    }
    Err(unknown())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = RulesServiceConfig::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.sync.conflict_strategy, ConflictStrategy::Overwrite);
        assert_eq!(config.sync.include_patterns, vec!["*.rules.md".to_string()]);
        assert!(config.sync.create_directories);
        assert!(config.sync.clean_orphaned);
        assert_eq!(config.performance.max_parallel_operations, 10);
        assert_eq!(config.performance.checksum_algorithm, ChecksumAlgorithm::Sha256);
    }

    #[test]
    fn test_agent_folder_path_gets_trailing_separator() {
        let folder: AgentFolder = serde_yaml::from_str("path: .cursor/rules\n").unwrap();
        assert_eq!(folder.path.as_str(), ".cursor/rules/");
        assert!(folder.enabled);
        assert_eq!(AgentFolder::new("a/b/", "").path.as_str(), "a/b/");
    }

    #[test]
    fn test_conflict_strategy_from_str() {
        assert_eq!("SKIP".parse::<ConflictStrategy>().unwrap(), ConflictStrategy::Skip);
        assert_eq!("ask".parse::<ConflictStrategy>().unwrap(), ConflictStrategy::Ask);
        assert!("merge".parse::<ConflictStrategy>().is_err());
    }

    #[test]
    fn test_enabled_folders_filters_disabled() {
        let mut config = RulesServiceConfig::with_standard_folders();
        config.agent_folders[1] = config.agent_folders[1].clone().disabled();
        let paths: Vec<_> = config.enabled_folders().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec![".cursor/rules/", ".cline/rules/", ".claude/rules/"]);
    }

    #[test]
    fn test_merge_with_overrides() {
        let config = RulesServiceConfig::default();
        let merged = config
            .merge_with_overrides(&[
                ("sync.conflict_strategy", Value::from("skip")),
                ("performance.max_parallel_operations", Value::from(2)),
            ])
            .unwrap();
        assert_eq!(merged.sync.conflict_strategy, ConflictStrategy::Skip);
        assert_eq!(merged.performance.max_parallel_operations, 2);
        assert_eq!(config.sync.conflict_strategy, ConflictStrategy::Overwrite);
    }

    #[test]
    fn test_merge_with_unknown_key_fails() {
        let err = RulesServiceConfig::default()
            .merge_with_overrides(&[("sync.nope", Value::from(true))])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOverride { ref key, .. } if key == "sync.nope"));
    }

    #[test]
    fn test_merge_rejects_bad_value() {
        let result = RulesServiceConfig::default()
            .merge_with_overrides(&[("sync.conflict_strategy", Value::from("merge"))]);
        assert!(result.is_err());
    }
}
