//! Deterministic remediation of validation issues
//!
//! Each fixable issue maps to one [`FixKind`]. Fixes run grouped by
//! [`FixCategory`]: front-matter first, then structure, then formatting, so
//! later passes can rely on a well-formed front-matter block. Spacing fixes
//! only touch real headings and list items outside fenced code.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use rules_content::frontmatter::{self, FrontmatterBlock, Split};
use rules_content::markdown::{Outline, collapse_blank_lines, trim_trailing_whitespace};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::issue::{IssueCategory, ValidationIssue};

static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"field:\s*([\w-]+)").expect("Invalid regex pattern"));

static SECTION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"section:\s*(.+)").expect("Invalid regex pattern"));

/// A list marker followed by extra spaces, or `-`/`*` glued to a word.
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)(?:([-*+])\s{2,}(\S)|([-*])(\p{L}))").expect("Invalid regex pattern")
});

static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+\S").expect("Invalid regex pattern"));

/// Front-matter keys in the order fixed documents use.
const CANONICAL_ORDER: &[&str] = &[
    "id",
    "title",
    "version",
    "status",
    "owner",
    "last_updated",
    "parent_charter",
    "related_rules",
    "applies_to",
    "tags",
];

const SECTION_PLACEHOLDER: &str = "*This section needs to be completed.*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixCategory {
    Frontmatter,
    Structure,
    Formatting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixKind {
    TrailingWhitespace,
    BlankLines,
    FinalNewline,
    ListMarkerSpacing,
    HeaderSpacing,
    MissingFrontmatterField,
    FrontmatterFieldOrder,
    MissingSection,
}

impl FixKind {
    pub fn category(&self) -> FixCategory {
        match self {
            Self::MissingFrontmatterField | Self::FrontmatterFieldOrder => FixCategory::Frontmatter,
            Self::MissingSection => FixCategory::Structure,
            Self::TrailingWhitespace
            | Self::BlankLines
            | Self::FinalNewline
            | Self::ListMarkerSpacing
            | Self::HeaderSpacing => FixCategory::Formatting,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrailingWhitespace => "trailing_whitespace",
            Self::BlankLines => "blank_lines",
            Self::FinalNewline => "final_newline",
            Self::ListMarkerSpacing => "list_marker_spacing",
            Self::HeaderSpacing => "header_spacing",
            Self::MissingFrontmatterField => "missing_frontmatter_field",
            Self::FrontmatterFieldOrder => "frontmatter_field_order",
            Self::MissingSection => "missing_section",
        }
    }
}

impl fmt::Display for FixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one fix attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixLogEntry {
    pub issue_id: String,
    pub fix_kind: FixKind,
    pub message: String,
    pub success: bool,
    pub details: Option<String>,
    pub error: Option<String>,
}

type FixResult = std::result::Result<(String, String), String>;

#[derive(Debug, Default, Clone, Copy)]
pub struct AutoFixer;

impl AutoFixer {
    pub fn new() -> Self {
        Self
    }

    /// The fix that would resolve `issue`, if any.
    pub fn classify(&self, issue: &ValidationIssue) -> Option<FixKind> {
        let message = issue.message.to_lowercase();
        let missing_content = issue.category == IssueCategory::MissingContent;

        if message.contains("trailing whitespace") {
            Some(FixKind::TrailingWhitespace)
        } else if message.contains("blank lines") {
            Some(FixKind::BlankLines)
        } else if message.contains("final newline") || message.contains("end of file") {
            Some(FixKind::FinalNewline)
        } else if message.contains("list") && (message.contains("indent") || message.contains("spacing")) {
            Some(FixKind::ListMarkerSpacing)
        } else if (message.contains("header") || message.contains("heading"))
            && (message.contains("spacing") || message.contains("blank line"))
        {
            Some(FixKind::HeaderSpacing)
        } else if (message.contains("missing required field")
            || message.contains("missing required frontmatter field")
            || (missing_content && message.contains("field") && !message.contains("section")))
            && FIELD_NAME.is_match(&message)
        {
            Some(FixKind::MissingFrontmatterField)
        } else if message.contains("field order") {
            Some(FixKind::FrontmatterFieldOrder)
        } else if (message.contains("missing required section")
            || (missing_content && message.contains("section")))
            && SECTION_NAME.is_match(&issue.message)
        {
            Some(FixKind::MissingSection)
        } else {
            None
        }
    }

    pub fn can_fix(&self, issue: &ValidationIssue) -> bool {
        self.classify(issue).is_some()
    }

    /// Apply every classifiable fix in category order.
    ///
    /// A failed fix is logged and leaves the content as it was before that
    /// fix; the remaining fixes still run.
    pub fn apply(&self, content: &str, issues: &[ValidationIssue]) -> (String, Vec<FixLogEntry>) {
        let mut planned: Vec<(FixKind, &ValidationIssue)> = issues
            .iter()
            .filter_map(|issue| self.classify(issue).map(|kind| (kind, issue)))
            .collect();
        planned.sort_by_key(|(kind, _)| kind.category());

        let mut text = content.to_string();
        let mut log = Vec::with_capacity(planned.len());

        for (kind, issue) in planned {
            match run_fix(kind, &text, issue) {
                Ok((fixed, details)) => {
                    tracing::debug!(rule_id = %issue.rule_id, fix = %kind, "applied fix");
                    text = fixed;
                    log.push(FixLogEntry {
                        issue_id: issue.rule_id.clone(),
                        fix_kind: kind,
                        message: issue.message.clone(),
                        success: true,
                        details: Some(details),
                        error: None,
                    });
                }
                Err(error) => {
                    tracing::warn!(rule_id = %issue.rule_id, fix = %kind, %error, "fix failed");
                    log.push(FixLogEntry {
                        issue_id: issue.rule_id.clone(),
                        fix_kind: kind,
                        message: issue.message.clone(),
                        success: false,
                        details: None,
                        error: Some(error),
                    });
                }
            }
        }

        (text, log)
    }
}

fn run_fix(kind: FixKind, content: &str, issue: &ValidationIssue) -> FixResult {
    match kind {
        FixKind::TrailingWhitespace => Ok((
            trim_trailing_whitespace(content),
            "Removed trailing whitespace".into(),
        )),
        FixKind::BlankLines => Ok((
            collapse_blank_lines(content),
            "Collapsed consecutive blank lines".into(),
        )),
        FixKind::FinalNewline => {
            if content.ends_with('\n') {
                Ok((content.to_string(), "Final newline already present".into()))
            } else {
                Ok((format!("{content}\n"), "Added final newline".into()))
            }
        }
        FixKind::ListMarkerSpacing => Ok((
            map_body_lines(content, normalize_list_marker),
            "Normalized list marker spacing".into(),
        )),
        FixKind::HeaderSpacing => Ok((
            separate_headings(content),
            "Added blank lines after headings".into(),
        )),
        FixKind::MissingFrontmatterField => insert_field(content, issue),
        FixKind::FrontmatterFieldOrder => reorder_fields(content),
        FixKind::MissingSection => append_section(content, issue),
    }
}

fn require_block(content: &str) -> std::result::Result<FrontmatterBlock<'_>, String> {
    match frontmatter::split(content) {
        Split::Block(block) => Ok(block),
        Split::Absent => Err("Document has no frontmatter block".into()),
        Split::Malformed(fence) => Err(format!("Frontmatter opened with {} is never closed", fence.as_str())),
    }
}

fn insert_field(content: &str, issue: &ValidationIssue) -> FixResult {
    let field = FIELD_NAME
        .captures(&issue.message)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| "Could not determine field name from issue".to_string())?;

    let block = require_block(content)?;
    let existing = frontmatter::parse_mapping(block.raw).map_err(|e| e.to_string())?;
    if existing.is_some_and(|map| map.contains_key(field.as_str())) {
        return Ok((content.to_string(), format!("Field '{field}' already present")));
    }

    let line = format!("{field}: {}\n", placeholder(&field));
    let at = block.raw_range.end;
    let mut fixed = String::with_capacity(content.len() + line.len() + 1);
    fixed.push_str(&content[..at]);
    if at > block.raw_range.start && !content[..at].ends_with('\n') {
        fixed.push('\n');
    }
    fixed.push_str(&line);
    fixed.push_str(&content[at..]);
    Ok((fixed, format!("Added field '{field}' with placeholder value")))
}

fn placeholder(field: &str) -> String {
    match field {
        "title" => "\"PLACEHOLDER: Add title\"".into(),
        "status" => "\"PLACEHOLDER: Set status\"".into(),
        "owner" => "\"PLACEHOLDER: Set owner\"".into(),
        "last_updated" | "last-updated" => chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        "version" => "\"1.0\"".into(),
        "tags" | "applies_to" | "applies-to" => "[\"PLACEHOLDER\"]".into(),
        _ => "\"PLACEHOLDER\"".into(),
    }
}

fn reorder_fields(content: &str) -> FixResult {
    let block = require_block(content)?;
    let Some(map) = frontmatter::parse_mapping(block.raw).map_err(|e| e.to_string())? else {
        return Ok((content.to_string(), "Frontmatter is empty".into()));
    };

    let mut ordered = Mapping::new();
    for key in CANONICAL_ORDER {
        if let Some(value) = map.get(*key) {
            ordered.insert(Value::from(*key), value.clone());
        }
    }
    for (key, value) in &map {
        if !ordered.contains_key(key) {
            ordered.insert(key.clone(), value.clone());
        }
    }

    let rendered = serde_yaml::to_string(&ordered).map_err(|e| e.to_string())?;
    let mut fixed = String::with_capacity(content.len());
    fixed.push_str(&content[..block.raw_range.start]);
    fixed.push_str(&rendered);
    fixed.push_str(&content[block.raw_range.end..]);
    Ok((fixed, "Reordered frontmatter fields".into()))
}

fn append_section(content: &str, issue: &ValidationIssue) -> FixResult {
    let name = SECTION_NAME
        .captures(&issue.message)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| "Could not determine section name from issue".to_string())?;

    let wanted = name.to_lowercase();
    let outline = Outline::parse(content);
    if outline.heading_texts().any(|h| h.to_lowercase().contains(&wanted)) {
        return Ok((content.to_string(), format!("Section '{name}' already present")));
    }

    let mut fixed = content.to_string();
    if !fixed.is_empty() && !fixed.ends_with('\n') {
        fixed.push('\n');
    }
    fixed.push_str(&format!("\n## {name}\n\n{SECTION_PLACEHOLDER}\n"));
    Ok((fixed, format!("Added section '{name}'")))
}

fn normalize_list_marker(line: &str) -> String {
    let Some(caps) = LIST_MARKER.captures(line) else {
        return line.to_string();
    };
    let glued = caps.get(4).is_some();
    let (Some(marker), Some(rest)) = (caps.get(2).or(caps.get(4)), caps.get(3).or(caps.get(5))) else {
        return line.to_string();
    };
    // `*word*` is emphasis, not a list item
    if glued && marker.as_str() == "*" && line[marker.end()..].contains('*') {
        return line.to_string();
    }
    format!("{}{} {}", &caps[1], marker.as_str(), &line[rest.start()..])
}

/// Lines after the front-matter block, with whether each sits inside fenced code.
fn body_lines(content: &str) -> impl Iterator<Item = (&str, bool)> {
    let skip = match frontmatter::split(content) {
        Split::Block(block) => block.closing_line + 1,
        Split::Absent | Split::Malformed(_) => 0,
    };

    let mut in_fence = false;
    content.split('\n').enumerate().map(move |(idx, line)| {
        if idx < skip {
            return (line, true);
        }
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            return (line, true);
        }
        (line, in_fence)
    })
}

/// Rewrite body lines outside fenced code, leaving front-matter untouched.
fn map_body_lines(content: &str, mut rewrite: impl FnMut(&str) -> String) -> String {
    body_lines(content)
        .map(|(line, protected)| if protected { line.to_string() } else { rewrite(line) })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Insert a blank line after each heading that runs straight into text.
fn separate_headings(content: &str) -> String {
    let lines: Vec<(&str, bool)> = body_lines(content).collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    for (idx, &(line, protected)) in lines.iter().enumerate() {
        out.push(line);
        if protected || !HEADING_LINE.is_match(line) {
            continue;
        }
        if let Some(&(next, _)) = lines.get(idx + 1) {
            if !next.trim().is_empty() && !HEADING_LINE.is_match(next) {
                out.push("");
            }
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn issue(category: IssueCategory, message: &str) -> ValidationIssue {
        ValidationIssue {
            rule_id: "doc_rule".into(),
            severity: Severity::Error,
            category,
            message: message.into(),
            line_number: None,
            column_number: None,
            file_path: "doc.md".into(),
            suggestion: None,
            auto_fixable: false,
            rule_source: None,
        }
    }

    #[rstest]
    #[case(IssueCategory::FormatError, "Line has trailing whitespace", Some(FixKind::TrailingWhitespace))]
    #[case(IssueCategory::FormatError, "Too many blank lines", Some(FixKind::BlankLines))]
    #[case(IssueCategory::FormatError, "Missing final newline", Some(FixKind::FinalNewline))]
    #[case(IssueCategory::FormatError, "List marker spacing is wrong", Some(FixKind::ListMarkerSpacing))]
    #[case(IssueCategory::FormatError, "Heading spacing is wrong", Some(FixKind::HeaderSpacing))]
    #[case(IssueCategory::MissingContent, "Missing required frontmatter field: owner", Some(FixKind::MissingFrontmatterField))]
    #[case(IssueCategory::InvalidFormat, "Frontmatter field order is not canonical", Some(FixKind::FrontmatterFieldOrder))]
    #[case(IssueCategory::MissingContent, "Missing required section: Context", Some(FixKind::MissingSection))]
    #[case(IssueCategory::MissingContent, "Document is missing required frontmatter", None)]
    #[case(IssueCategory::IncompleteAnalysis, "Content too short: 3 words (minimum 50)", None)]
    fn test_classify(#[case] category: IssueCategory, #[case] message: &str, #[case] expected: Option<FixKind>) {
        assert_eq!(AutoFixer::new().classify(&issue(category, message)), expected);
    }

    #[test]
    fn test_insert_field_before_closing_fence() {
        let content = "---\ntitle: T\n---\n# Body\n";
        let (fixed, log) = AutoFixer::new().apply(
            content,
            &[issue(IssueCategory::MissingContent, "Missing required frontmatter field: owner")],
        );
        assert_eq!(fixed, "---\ntitle: T\nowner: \"PLACEHOLDER: Set owner\"\n---\n# Body\n");
        assert!(log[0].success);
    }

    #[test]
    fn test_insert_field_is_idempotent() {
        let content = "---\nowner: me\n---\n";
        let (fixed, log) = AutoFixer::new().apply(
            content,
            &[issue(IssueCategory::MissingContent, "Missing required frontmatter field: owner")],
        );
        assert_eq!(fixed, content);
        assert!(log[0].success);
        assert_eq!(log[0].details.as_deref(), Some("Field 'owner' already present"));
    }

    #[test]
    fn test_insert_field_without_block_fails_and_continues() {
        let content = "# Body";
        let (fixed, log) = AutoFixer::new().apply(
            content,
            &[
                issue(IssueCategory::MissingContent, "Missing required frontmatter field: owner"),
                issue(IssueCategory::FormatError, "Missing final newline"),
            ],
        );
        assert_eq!(fixed, "# Body\n");
        assert_eq!(log.len(), 2);
        assert!(!log[0].success);
        assert!(log[0].error.is_some());
        assert!(log[1].success);
    }

    #[test]
    fn test_fixes_run_in_category_order() {
        let (_, log) = AutoFixer::new().apply(
            "---\ntitle: T\n---\n",
            &[
                issue(IssueCategory::FormatError, "Missing final newline"),
                issue(IssueCategory::MissingContent, "Missing required section: Context"),
                issue(IssueCategory::MissingContent, "Missing required frontmatter field: status"),
            ],
        );
        let kinds: Vec<_> = log.iter().map(|e| e.fix_kind).collect();
        assert_eq!(
            kinds,
            vec![FixKind::MissingFrontmatterField, FixKind::MissingSection, FixKind::FinalNewline]
        );
    }

    #[test]
    fn test_append_section() {
        let (fixed, _) = AutoFixer::new().apply(
            "# Title\nbody",
            &[issue(IssueCategory::MissingContent, "Missing required section: Consequences")],
        );
        assert_eq!(
            fixed,
            "# Title\nbody\n\n## Consequences\n\n*This section needs to be completed.*\n"
        );
    }

    #[test]
    fn test_reorder_fields_keeps_unknown_keys_last() {
        let content = "---\ncustom: 1\nowner: me\ntitle: T\n---\nbody\n";
        let (fixed, _) = AutoFixer::new().apply(
            content,
            &[issue(IssueCategory::InvalidFormat, "Frontmatter field order is not canonical")],
        );
        assert_eq!(fixed, "---\ntitle: T\nowner: me\ncustom: 1\n---\nbody\n");
    }

    #[test]
    fn test_spacing_fixes_skip_code_and_frontmatter() {
        let content = "---\n-x: 1\n---\n## Title\n-item\n*  starred\n```\n-code\n# not a heading\nx\n```\n";
        let fixer = AutoFixer::new();
        let (fixed, _) = fixer.apply(
            content,
            &[
                issue(IssueCategory::FormatError, "List marker spacing is wrong"),
                issue(IssueCategory::FormatError, "Heading spacing is wrong"),
            ],
        );
        assert_eq!(
            fixed,
            "---\n-x: 1\n---\n## Title\n\n- item\n* starred\n```\n-code\n# not a heading\nx\n```\n"
        );
    }

    #[test]
    fn test_spacing_fixes_leave_prose_alone() {
        let content = "---\ntitle: T\n---\n# Title\nBody text\n#42 was fixed upstream\n-1 degrees is cold\n*emphasis* stays\n";
        let (fixed, log) = AutoFixer::new().apply(
            content,
            &[
                issue(IssueCategory::FormatError, "Heading spacing is wrong"),
                issue(IssueCategory::FormatError, "List marker spacing is wrong"),
            ],
        );
        assert_eq!(
            fixed,
            "---\ntitle: T\n---\n# Title\n\nBody text\n#42 was fixed upstream\n-1 degrees is cold\n*emphasis* stays\n"
        );
        assert!(log.iter().all(|entry| entry.success));
    }

    #[test]
    fn test_heading_spacing_keeps_consecutive_headings_and_gaps() {
        let content = "# Title\n## Sub\n\ntext\n## Last";
        let (fixed, _) = AutoFixer::new().apply(
            content,
            &[issue(IssueCategory::FormatError, "Heading spacing is wrong")],
        );
        assert_eq!(fixed, content);
    }

    #[rstest]
    #[case(FixKind::MissingFrontmatterField, FixCategory::Frontmatter)]
    #[case(FixKind::MissingSection, FixCategory::Structure)]
    #[case(FixKind::HeaderSpacing, FixCategory::Formatting)]
    #[case(FixKind::ListMarkerSpacing, FixCategory::Formatting)]
    fn test_fix_categories(#[case] kind: FixKind, #[case] expected: FixCategory) {
        assert_eq!(kind.category(), expected);
    }
}
