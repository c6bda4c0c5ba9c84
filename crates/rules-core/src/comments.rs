//! Human-input comments for issues that need a person
//!
//! Comments are HTML blocks so they stay invisible in rendered markdown:
//!
//! ```text
//! <!-- HUMAN-INPUT-REQUIRED: MISSING-CONTENT
//! Issue: Missing required section: Context
//! Required Action: Add a '## Context' section
//! Context: Rule source: rules/decisions.rules.md; Rule ID: decisions_context
//! Priority: high
//! -->
//! ```

use std::fmt;

use rules_content::frontmatter::{self, Split};
use serde::{Deserialize, Serialize};

use crate::issue::{IssueCategory, Severity, ValidationIssue};

const MARKER: &str = "HUMAN-INPUT-REQUIRED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl From<Severity> for Priority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Self::High,
            Severity::Warning => Self::Medium,
            Severity::Info => Self::Low,
        }
    }
}

/// Where a comment ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Directly after the issue's 1-based line.
    AfterLine(usize),
    BeforeFrontmatterClose,
    EndOfFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanInputComment {
    pub category: IssueCategory,
    pub message: String,
    pub action: String,
    pub context: Vec<String>,
    pub priority: Priority,
}

impl HumanInputComment {
    /// Upper kebab form of the category, e.g. `MISSING-CONTENT`.
    pub fn label(&self) -> String {
        self.category.as_str().to_uppercase()
    }

    pub fn line_count(&self) -> usize {
        self.to_string().lines().count()
    }
}

impl fmt::Display for HumanInputComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<!-- {MARKER}: {}", self.label())?;
        writeln!(f, "Issue: {}", self.message)?;
        writeln!(f, "Required Action: {}", self.action)?;
        if self.context.is_empty() {
            writeln!(f, "Context: No additional context")?;
        } else {
            writeln!(f, "Context: {}", self.context.join("; "))?;
        }
        writeln!(f, "Priority: {}", self.priority.as_str())?;
        write!(f, "-->")
    }
}

/// One entry in the comment log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentInsertion {
    pub issue_id: String,
    pub category: IssueCategory,
    /// 1-based line of the comment's first line in the output.
    pub inserted_at: usize,
    pub placement: Placement,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HumanInputCommentGenerator;

impl HumanInputCommentGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_comment(&self, issue: &ValidationIssue) -> HumanInputComment {
        let mut context = Vec::new();
        if let Some(source) = &issue.rule_source {
            context.push(format!("Rule source: {}", source.display()));
        }
        if let Some(line) = issue.line_number {
            context.push(format!("Line {line}"));
        }
        if !issue.rule_id.is_empty() {
            context.push(format!("Rule ID: {}", issue.rule_id));
        }

        HumanInputComment {
            category: issue.category,
            message: issue.message.clone(),
            action: issue
                .suggestion
                .clone()
                .unwrap_or_else(|| default_action(issue.category).to_string()),
            context,
            priority: issue.severity.into(),
        }
    }

    pub fn generate_comments(&self, issues: &[ValidationIssue]) -> Vec<HumanInputComment> {
        issues.iter().map(|issue| self.generate_comment(issue)).collect()
    }

    /// Insert one comment per issue and report where each landed.
    ///
    /// Positions are all resolved against the original text, then applied
    /// bottom-up. Comments sharing a position keep the order of `issues`.
    /// The output keeps the input's line ending and trailing newline.
    pub fn insert_comments_in_content(
        &self,
        content: &str,
        issues: &[ValidationIssue],
    ) -> (String, Vec<CommentInsertion>) {
        if issues.is_empty() {
            return (content.to_string(), Vec::new());
        }

        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        let line_total = lines.len();
        let closing_fence = match frontmatter::split(content) {
            Split::Block(block) => Some(block.closing_line),
            Split::Absent | Split::Malformed(_) => None,
        };

        // (lines before the insertion point, input index, placement, comment lines)
        let mut planned: Vec<(usize, usize, Placement, Vec<String>)> = issues
            .iter()
            .enumerate()
            .map(|(idx, issue)| {
                let (at, placement) = locate(issue, line_total, closing_fence);
                let rendered = self.generate_comment(issue).to_string();
                (at, idx, placement, rendered.lines().map(str::to_string).collect())
            })
            .collect();

        // Final positions, computed top-down before the text is touched.
        planned.sort_by_key(|(at, idx, _, _)| (*at, *idx));
        let mut log = Vec::with_capacity(planned.len());
        let mut shift = 0;
        for (at, idx, placement, block) in &planned {
            let issue = &issues[*idx];
            log.push((
                *idx,
                CommentInsertion {
                    issue_id: issue.rule_id.clone(),
                    category: issue.category,
                    inserted_at: at + shift + 1,
                    placement: *placement,
                },
            ));
            shift += block.len();
        }
        log.sort_by_key(|(idx, _)| *idx);

        for (at, _, _, block) in planned.into_iter().rev() {
            lines.splice(at..at, block);
        }

        let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
        let mut output = lines.join(newline);
        if content.ends_with('\n') {
            output.push_str(newline);
        }
        tracing::debug!(count = log.len(), "inserted human-input comments");
        (output, log.into_iter().map(|(_, entry)| entry).collect())
    }
}

fn locate(issue: &ValidationIssue, line_total: usize, closing_fence: Option<usize>) -> (usize, Placement) {
    let end = (line_total, Placement::EndOfFile);

    if let Some(line) = issue.line_number {
        return if (1..=line_total).contains(&line) {
            (line, Placement::AfterLine(line))
        } else {
            end
        };
    }

    let message = issue.message.to_lowercase();
    let missing_section = message.contains("missing required section")
        || (issue.category == IssueCategory::MissingContent && message.contains("section"));
    if missing_section {
        return end;
    }

    if message.contains("frontmatter") || message.contains("field") {
        if let Some(fence) = closing_fence {
            return (fence, Placement::BeforeFrontmatterClose);
        }
    }
    end
}

fn default_action(category: IssueCategory) -> &'static str {
    match category {
        IssueCategory::MissingContent => "Add the required content",
        IssueCategory::InvalidReference => "Update reference to valid target",
        IssueCategory::IncompleteAnalysis => "Expand analysis with more detail",
        IssueCategory::ClarificationNeeded => "Clarify the ambiguous content",
        IssueCategory::DecisionRequired => "Choose appropriate option",
        IssueCategory::FormatError | IssueCategory::InvalidFormat => "Manually fix the formatting issue",
        IssueCategory::ReviewNeeded => "Review and approve the content",
    }
}
