//! Typed model of a rules document's front-matter
//!
//! Keys are accepted in snake_case or kebab-case. Keys the model does not
//! know about are kept in [`RuleDocument::extra`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::{Error, Result};

/// How strictly a rule set is meant to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementLevel {
    #[default]
    Strict,
    Advisory,
    Deprecated,
}

impl FromStr for EnforcementLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "advisory" => Ok(Self::Advisory),
            "deprecated" => Ok(Self::Deprecated),
            _ => Err(Error::UnknownVariant {
                kind: "enforcement level",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EnforcementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Advisory => write!(f, "advisory"),
            Self::Deprecated => write!(f, "deprecated"),
        }
    }
}

/// A parsed rules file.
///
/// Documents are values: discovery replaces them wholesale and never edits
/// one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub title: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub status: String,
    pub owner: String,
    #[serde(alias = "last-updated", with = "timestamp")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "applies-to")]
    pub applies_to: Vec<String>,
    #[serde(default, alias = "enforcement-level")]
    pub enforcement_level: EnforcementLevel,
    #[serde(alias = "parent-charter")]
    pub parent_charter: String,
    #[serde(skip)]
    pub file_path: PathBuf,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl RuleDocument {
    /// Build a document from a parsed front-matter mapping.
    ///
    /// A non-string `version` scalar is turned into its string form first.
    pub fn from_frontmatter(mut frontmatter: Mapping, path: &Path) -> Result<Self> {
        if let Some(version) = frontmatter.get_mut("version") {
            coerce_to_string(version);
        }

        let invalid = |message: String| Error::InvalidDocument {
            path: path.to_path_buf(),
            message,
        };

        let mut document: Self =
            serde_yaml::from_value(Value::Mapping(frontmatter)).map_err(|e| invalid(e.to_string()))?;
        if document.parent_charter.trim().is_empty() {
            return Err(invalid("parent_charter must not be empty".into()));
        }
        document.file_path = path.to_path_buf();
        Ok(document)
    }

    /// Charter file stem with any `.charter` suffix removed.
    pub fn rule_category(&self) -> String {
        let stem = Path::new(&self.parent_charter)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let category = stem.strip_suffix(".charter").unwrap_or(&stem);
        if category.is_empty() {
            "uncategorized".to_string()
        } else {
            category.to_string()
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_path.file_name().and_then(|n| n.to_str())
    }

    pub fn has_all_tags(&self, tags: &[&str]) -> bool {
        tags.iter().all(|tag| self.tags.iter().any(|t| t == tag))
    }

    pub fn has_any_tag(&self, tags: &[&str]) -> bool {
        tags.iter().any(|tag| self.tags.iter().any(|t| t == tag))
    }
}

fn coerce_to_string(value: &mut Value) {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return,
    };
    *value = Value::String(text);
}

/// Lenient timestamp (de)serialization for `last_updated`.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (or space separated)
/// date-time read as UTC, or a bare `YYYY-MM-DD` at midnight UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid last_updated timestamp: {text}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    const BASE: &str = "title: Quality Rules\nstatus: active\nowner: platform\nlast_updated: 2025-01-15\nparent_charter: charters/quality.charter.md\n";

    #[test]
    fn test_version_number_is_coerced() {
        let doc = RuleDocument::from_frontmatter(
            mapping(&format!("{BASE}version: 2\n")),
            Path::new("q.rules.md"),
        )
        .unwrap();
        assert_eq!(doc.version, "2");
    }

    #[test]
    fn test_defaults_and_extra_keys() {
        let doc = RuleDocument::from_frontmatter(
            mapping(&format!("{BASE}reviewers: [ana]\n")),
            Path::new("docs/q.rules.md"),
        )
        .unwrap();
        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.enforcement_level, EnforcementLevel::Strict);
        assert!(doc.tags.is_empty());
        assert!(doc.extra.contains_key("reviewers"));
        assert_eq!(doc.file_name(), Some("q.rules.md"));
    }

    #[test]
    fn test_kebab_case_keys() {
        let yaml = "title: T\nstatus: s\nowner: o\nlast-updated: 2025-01-15T10:00:00Z\nparent-charter: x.charter.md\napplies-to: [decision]\nenforcement-level: advisory\n";
        let doc = RuleDocument::from_frontmatter(mapping(yaml), Path::new("t.rules.md")).unwrap();
        assert_eq!(doc.applies_to, vec!["decision".to_string()]);
        assert_eq!(doc.enforcement_level, EnforcementLevel::Advisory);
    }

    #[test]
    fn test_empty_parent_charter_rejected() {
        let yaml = BASE.replace("charters/quality.charter.md", "\"\"");
        let err = RuleDocument::from_frontmatter(mapping(&yaml), Path::new("q.rules.md")).unwrap_err();
        assert!(err.to_string().contains("parent_charter"));
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let yaml = BASE.replace("owner: platform\n", "");
        assert!(RuleDocument::from_frontmatter(mapping(&yaml), Path::new("q.rules.md")).is_err());
    }

    #[rstest]
    #[case("charters/quality.charter.md", "quality")]
    #[case("os/governance.md", "governance")]
    #[case("plain", "plain")]
    #[case(".charter.md", "uncategorized")]
    fn test_rule_category(#[case] charter: &str, #[case] expected: &str) {
        let yaml = BASE.replace("charters/quality.charter.md", charter);
        let doc = RuleDocument::from_frontmatter(mapping(&yaml), Path::new("q.rules.md")).unwrap();
        assert_eq!(doc.rule_category(), expected);
    }

    #[rstest]
    #[case("2025-01-15T10:30:00Z")]
    #[case("2025-01-15T10:30:00+00:00")]
    #[case("2025-01-15T10:30:00")]
    #[case("2025-01-15 10:30:00")]
    fn test_timestamp_formats(#[case] text: &str) {
        let parsed = timestamp::parse(text).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_enforcement_level_round_trip() {
        for level in [
            EnforcementLevel::Strict,
            EnforcementLevel::Advisory,
            EnforcementLevel::Deprecated,
        ] {
            assert_eq!(level.to_string().parse::<EnforcementLevel>().unwrap(), level);
        }
        assert!("loose".parse::<EnforcementLevel>().is_err());
    }
}
