//! Extracted validation directives

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::issue::Severity;
use crate::{Error, Result};

/// How a directive is applied to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Required front-matter keys.
    Frontmatter,
    /// A regular expression that must (or must not) match.
    Pattern,
    /// Body-level checks such as a minimum word count.
    Content,
    /// Required headings.
    Section,
}

impl RuleKind {
    pub const ALL: [RuleKind; 4] = [Self::Frontmatter, Self::Pattern, Self::Content, Self::Section];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frontmatter => "frontmatter",
            Self::Pattern => "pattern",
            Self::Content => "content",
            Self::Section => "section",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == lowered)
            .ok_or_else(|| Error::UnknownVariant {
                kind: "rule kind",
                value: s.to_string(),
            })
    }
}

/// One validation directive pulled out of a rules document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRule {
    pub rule_id: String,
    pub kind: RuleKind,
    pub description: String,
    pub pattern: Option<String>,
    /// Field names for frontmatter rules, heading names for section rules.
    pub required: Vec<String>,
    pub severity: Severity,
    /// Document kinds this rule targets; empty means every kind.
    pub applies_to: Vec<String>,
    pub source_file: Option<PathBuf>,
    pub line_number: Option<usize>,
}

impl ExtractedRule {
    pub fn new(rule_id: impl Into<String>, kind: RuleKind, description: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            kind,
            description: description.into(),
            pattern: None,
            required: Vec::new(),
            severity: Severity::default(),
            applies_to: Vec::new(),
            source_file: None,
            line_number: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_required<I, S>(mut self, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = required.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_applies_to<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applies_to = kinds.into_iter().map(Into::into).collect();
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line_number = Some(line);
        self
    }

    pub fn is_universal(&self) -> bool {
        self.applies_to.is_empty()
    }
}
