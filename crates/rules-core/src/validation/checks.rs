//! Per-kind rule checks against one document

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use rules_content::frontmatter::{self, Split};
use rules_content::markdown::{Outline, word_count};
use serde_yaml::Mapping;

use crate::issue::{IssueCategory, ValidationIssue};
use crate::rule::{ExtractedRule, RuleKind};

static WORD_MINIMUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*words?\b").expect("Invalid regex pattern"));

/// A document prepared once and checked against many rules.
pub(crate) struct Document<'a> {
    path: &'a Path,
    content: &'a str,
    /// `None` when there is no closed front-matter block at all.
    frontmatter: Option<Mapping>,
    headings: Vec<String>,
}

impl<'a> Document<'a> {
    pub(crate) fn new(path: &'a Path, content: &'a str) -> Self {
        let frontmatter = match frontmatter::split(content) {
            Split::Block(block) => Some(
                frontmatter::parse_mapping(block.raw)
                    .ok()
                    .flatten()
                    .unwrap_or_default(),
            ),
            Split::Absent | Split::Malformed(_) => None,
        };
        let headings = Outline::parse(content)
            .heading_texts()
            .map(str::to_lowercase)
            .collect();
        Self {
            path,
            content,
            frontmatter,
            headings,
        }
    }

    pub(crate) fn check(&self, rule: &ExtractedRule, patterns: &HashMap<String, Regex>) -> Vec<ValidationIssue> {
        match rule.kind {
            RuleKind::Frontmatter => self.check_frontmatter(rule),
            RuleKind::Pattern => patterns
                .get(&rule.rule_id)
                .map(|regex| self.check_pattern(rule, regex))
                .unwrap_or_default(),
            RuleKind::Content => self.check_content(rule),
            RuleKind::Section => self.check_sections(rule),
        }
    }

    fn issue(&self, rule: &ExtractedRule, category: IssueCategory, message: String) -> ValidationIssue {
        ValidationIssue::from_rule(rule, category, message, self.path)
    }

    fn check_frontmatter(&self, rule: &ExtractedRule) -> Vec<ValidationIssue> {
        if rule.required.is_empty() {
            return Vec::new();
        }
        let Some(map) = &self.frontmatter else {
            return vec![
                self.issue(
                    rule,
                    IssueCategory::MissingContent,
                    "Document is missing required frontmatter".into(),
                )
                .at_line(1)
                .with_suggestion(format!(
                    "Add a frontmatter block with: {}",
                    rule.required.join(", ")
                )),
            ];
        };

        rule.required
            .iter()
            .filter(|field| !map.contains_key(field.as_str()))
            .map(|field| {
                self.issue(
                    rule,
                    IssueCategory::MissingContent,
                    format!("Missing required frontmatter field: {field}"),
                )
                .with_suggestion(format!("Add '{field}:' to the frontmatter"))
            })
            .collect()
    }

    fn check_pattern(&self, rule: &ExtractedRule, regex: &Regex) -> Vec<ValidationIssue> {
        let description = rule.description.to_lowercase();
        if description.contains("must not") || description.contains("should not") {
            return self
                .content
                .split('\n')
                .enumerate()
                .filter(|(_, line)| regex.is_match(line))
                .map(|(idx, _)| {
                    self.issue(
                        rule,
                        IssueCategory::InvalidFormat,
                        format!("Line violates pattern rule: {}", rule.description),
                    )
                    .at_line(idx + 1)
                })
                .collect();
        }

        if regex.is_match(self.content) {
            Vec::new()
        } else {
            vec![self.issue(
                rule,
                IssueCategory::InvalidFormat,
                format!("Document does not match required pattern: {}", rule.description),
            )]
        }
    }

    fn check_content(&self, rule: &ExtractedRule) -> Vec<ValidationIssue> {
        let description = rule.description.to_lowercase();
        if !(description.contains("minimum") || description.contains("at least")) {
            return Vec::new();
        }
        let Some(minimum) = WORD_MINIMUM
            .captures(&description)
            .and_then(|caps| caps[1].parse::<usize>().ok())
        else {
            return Vec::new();
        };

        let words = word_count(self.content);
        if words >= minimum {
            return Vec::new();
        }
        vec![
            self.issue(
                rule,
                IssueCategory::IncompleteAnalysis,
                format!("Content too short: {words} words (minimum {minimum})"),
            )
            .with_suggestion(format!("Add more detail to meet the {minimum} word minimum")),
        ]
    }

    fn check_sections(&self, rule: &ExtractedRule) -> Vec<ValidationIssue> {
        rule.required
            .iter()
            .filter(|section| {
                let wanted = section.to_lowercase();
                !self.headings.iter().any(|h| h.contains(&wanted))
            })
            .map(|section| {
                self.issue(
                    rule,
                    IssueCategory::MissingContent,
                    format!("Missing required section: {section}"),
                )
                .with_suggestion(format!("Add a '## {section}' section"))
            })
            .collect()
    }
}
