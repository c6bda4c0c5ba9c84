//! Directives from bullet lists.
//!
//! - `Rule <n>: <text>` bullets anywhere become content rules.
//! - Bullets opening with Must/Should/Shall/May become content rules when
//!   their heading mentions "rule" or "validation".
//! - Bullets under a "Required Sections" heading form one section rule per
//!   heading.

use std::sync::LazyLock;

use regex::Regex;
use rules_content::{Bullet, Outline};

use super::{clean_cell, infer_severity, slug};
use crate::rule::{ExtractedRule, RuleKind};

static NUMBERED_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^rule\s+(\d+(?:\.\d+)?):?\s*(.+)$").expect("rule regex"));

static MODAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(must|should|shall|may)\s+(.+)$").expect("modal regex"));

pub(super) fn extract(prefix: &str, outline: &Outline) -> Vec<ExtractedRule> {
    let mut rules = Vec::new();
    let mut modal_ordinal = 0;
    let mut sections: Vec<(String, Vec<&Bullet>)> = Vec::new();

    for bullet in &outline.bullets {
        let heading = bullet.heading.as_deref().unwrap_or("");
        let heading_lower = heading.to_lowercase();

        if let Some(caps) = NUMBERED_RULE.captures(&bullet.text) {
            let description = caps[2].trim().to_string();
            let severity = infer_severity(&description);
            rules.push(
                ExtractedRule::new(
                    format!("{prefix}_rule_{}", slug(&caps[1])),
                    RuleKind::Content,
                    description,
                )
                .with_severity(severity)
                .at_line(bullet.line),
            );
        } else if heading_lower.contains("required section") {
            match sections.last_mut() {
                Some((name, items)) if name.as_str() == heading => items.push(bullet),
                _ => sections.push((heading.to_string(), vec![bullet])),
            }
        } else if let Some(caps) = MODAL.captures(&bullet.text) {
            if !(heading_lower.contains("rule") || heading_lower.contains("validation")) {
                continue;
            }
            modal_ordinal += 1;
            let severity = infer_severity(&bullet.text);
            rules.push(
                ExtractedRule::new(
                    format!(
                        "{prefix}_{}_{}_{modal_ordinal}",
                        slug(heading),
                        caps[1].to_lowercase()
                    ),
                    RuleKind::Content,
                    bullet.text.clone(),
                )
                .with_severity(severity)
                .at_line(bullet.line),
            );
        }
    }

    for (heading, bullets) in sections {
        let names: Vec<String> = bullets
            .iter()
            .map(|b| section_name(&b.text))
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            continue;
        }
        let description = format!("{heading}: {}", names.join(", "));
        let severity = infer_severity(&description);
        rules.push(
            ExtractedRule::new(
                format!("{prefix}_{}", slug(&heading)),
                RuleKind::Section,
                description,
            )
            .with_required(names)
            .with_severity(severity)
            .at_line(bullets[0].line),
        );
    }
    rules
}

/// `## Context` or `` `Context` `` or `Context: why it matters` all name "Context".
fn section_name(text: &str) -> String {
    let name = text.split_once(':').map_or(text, |(name, _)| name);
    clean_cell(name.trim_start_matches('#'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numbered_rules() {
        let outline = Outline::parse("# Anything\n\n- Rule 1: Must cite sources\n- rule 2.1 Should link briefs\n");
        let rules = extract("doc", &outline);
        let ids: Vec<_> = rules.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["doc_rule_1", "doc_rule_2_1"]);
        assert_eq!(rules[0].description, "Must cite sources");
        assert_eq!(rules[0].line_number, Some(3));
        assert_eq!(rules[1].severity, Severity::Warning);
    }

    #[test]
    fn test_modal_bullets_need_rule_heading() {
        let outline = Outline::parse(
            "## Background\n- Must be ignored\n\n## Validation Rules\n- Must include a title\n- Should add examples\n- May include diagrams\n- Plain note\n",
        );
        let rules = extract("doc", &outline);
        let severities: Vec<_> = rules.iter().map(|r| r.severity).collect();
        assert_eq!(severities, vec![Severity::Error, Severity::Warning, Severity::Info]);
        assert_eq!(rules[0].rule_id, "doc_validation_rules_must_1");
        assert_eq!(rules[2].rule_id, "doc_validation_rules_may_3");
    }

    #[test]
    fn test_required_sections_form_one_rule() {
        let outline = Outline::parse(
            "## Required Sections\n- `Context`\n- ## Decision\n- Consequences: what follows\n",
        );
        let rules = extract("dec", &outline);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].kind, RuleKind::Section);
        assert_eq!(rules[0].rule_id, "dec_required_sections");
        assert_eq!(rules[0].required, vec!["Context", "Decision", "Consequences"]);
        assert_eq!(rules[0].severity, Severity::Error);
    }
}
