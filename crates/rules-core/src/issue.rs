//! Validation issue and result types

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::detect::DocumentKind;
use crate::rule::ExtractedRule;
use crate::{Error, Result};

/// Severity shared by extracted rules and the issues they raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            _ => Err(Error::UnknownVariant {
                kind: "severity",
                value: s.to_string(),
            }),
        }
    }
}

/// What kind of attention an issue needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCategory {
    MissingContent,
    InvalidFormat,
    InvalidReference,
    IncompleteAnalysis,
    ClarificationNeeded,
    DecisionRequired,
    FormatError,
    ReviewNeeded,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 8] = [
        Self::MissingContent,
        Self::InvalidFormat,
        Self::InvalidReference,
        Self::IncompleteAnalysis,
        Self::ClarificationNeeded,
        Self::DecisionRequired,
        Self::FormatError,
        Self::ReviewNeeded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingContent => "missing-content",
            Self::InvalidFormat => "invalid-format",
            Self::InvalidReference => "invalid-reference",
            Self::IncompleteAnalysis => "incomplete-analysis",
            Self::ClarificationNeeded => "clarification-needed",
            Self::DecisionRequired => "decision-required",
            Self::FormatError => "format-error",
            Self::ReviewNeeded => "review-needed",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lowered)
            .ok_or_else(|| Error::UnknownVariant {
                kind: "issue category",
                value: s.to_string(),
            })
    }
}

/// A single finding against one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub rule_id: String,
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    pub line_number: Option<usize>,
    pub column_number: Option<usize>,
    pub file_path: PathBuf,
    pub suggestion: Option<String>,
    pub auto_fixable: bool,
    /// Rules document the triggering rule came from.
    pub rule_source: Option<PathBuf>,
}

impl ValidationIssue {
    /// An issue raised by `rule`, inheriting its id, severity and source.
    pub fn from_rule(
        rule: &ExtractedRule,
        category: IssueCategory,
        message: impl Into<String>,
        file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rule_id: rule.rule_id.clone(),
            severity: rule.severity,
            category,
            message: message.into(),
            line_number: None,
            column_number: None,
            file_path: file_path.into(),
            suggestion: None,
            auto_fixable: false,
            rule_source: rule.source_file.clone(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line_number = Some(line);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// All issues found in one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub file_path: PathBuf,
    pub document_kind: DocumentKind,
    pub issues: Vec<ValidationIssue>,
    pub rules_checked: usize,
    pub elapsed: Duration,
}

/// Counts suitable for a report line or JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub file_path: PathBuf,
    pub document_kind: DocumentKind,
    pub is_valid: bool,
    pub total_issues: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub auto_fixable: usize,
    pub rules_checked: usize,
}

impl ValidationResult {
    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(Severity::Info)
    }

    pub fn auto_fixable_count(&self) -> usize {
        self.issues.iter().filter(|i| i.auto_fixable).count()
    }

    /// True when no error-severity issue was raised.
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    pub fn issues_by_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn issues_by_category(
        &self,
        category: IssueCategory,
    ) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary {
            file_path: self.file_path.clone(),
            document_kind: self.document_kind,
            is_valid: self.is_valid(),
            total_issues: self.issues.len(),
            errors: self.error_count(),
            warnings: self.warning_count(),
            info: self.info_count(),
            auto_fixable: self.auto_fixable_count(),
            rules_checked: self.rules_checked,
        }
    }
}
