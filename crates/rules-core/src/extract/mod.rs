//! Rule extraction from rules documents
//!
//! Three independent passes read a document's outline: tables, fenced code
//! blocks and bullet lists. Their results are concatenated, then every rule
//! inherits the document's applies-to list and path when it has none of
//! its own.

mod blocks;
mod lists;
mod tables;

use std::collections::HashMap;

use rules_content::Outline;
use rules_meta::RuleDocument;

use crate::issue::Severity;
use crate::rule::ExtractedRule;

/// Stateless extractor; one instance can serve every document.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleExtractor;

impl RuleExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every directive from `content`, the full text of `document`.
    pub fn extract(&self, document: &RuleDocument, content: &str) -> Vec<ExtractedRule> {
        let outline = Outline::parse(content);
        let prefix = slug(&document.title);

        let mut rules = tables::extract(&prefix, &outline);
        rules.extend(blocks::extract(&prefix, &outline));
        rules.extend(lists::extract(&prefix, &outline));

        let rules = inherit(rules, document);
        tracing::debug!(
            document = %document.file_path.display(),
            count = rules.len(),
            "extracted rules"
        );
        rules
    }
}

fn inherit(rules: Vec<ExtractedRule>, document: &RuleDocument) -> Vec<ExtractedRule> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    rules
        .into_iter()
        .map(|mut rule| {
            if rule.applies_to.is_empty() {
                rule.applies_to = document.applies_to.clone();
            }
            if rule.source_file.is_none() {
                rule.source_file = Some(document.file_path.clone());
            }
            let count = seen.entry(rule.rule_id.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                rule.rule_id = format!("{}_{}", rule.rule_id, count);
            }
            rule
        })
        .collect()
}

/// Classify a directive by the modal keywords in its description.
///
/// Whole words only, so "cannot" does not read as "can".
pub fn infer_severity(description: &str) -> Severity {
    let lowered = description.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has = |candidates: &[&str]| words.iter().any(|w| candidates.contains(w));

    if has(&["must", "required", "shall"]) {
        Severity::Error
    } else if has(&["should", "recommended"]) {
        Severity::Warning
    } else if has(&["may", "optional", "can"]) {
        Severity::Info
    } else {
        Severity::Error
    }
}

/// Lowercase identifier fragment: whitespace becomes `_`, punctuation other
/// than `-` and `_` is dropped.
pub(crate) fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() || c == '-' {
            out.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '_' || c == '.') && !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

/// Strip inline-code backticks and surrounding whitespace from a cell.
pub(crate) fn clean_cell(text: &str) -> String {
    text.trim().trim_matches('`').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Must include a title", Severity::Error)]
    #[case("Should add examples", Severity::Warning)]
    #[case("May include diagrams", Severity::Info)]
    #[case("A title is required", Severity::Error)]
    #[case("Optional: link related briefs", Severity::Info)]
    #[case("Headings cannot be empty", Severity::Error)]
    #[case("Use sentence case", Severity::Error)]
    fn test_infer_severity(#[case] text: &str, #[case] expected: Severity) {
        assert_eq!(infer_severity(text), expected);
    }

    #[rstest]
    #[case("Decision Rules", "decision_rules")]
    #[case("DEC-001: Adopt  Rust", "dec-001_adopt_rust")]
    #[case("  `last_updated` ", "last_updated")]
    #[case("Rule 2.1", "rule_2_1")]
    fn test_slug(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(slug(text), expected);
    }
}
