//! Directives from fenced code blocks.
//!
//! `regex`, `regexp` and `pattern` blocks become pattern rules; `yaml`
//! blocks list required front-matter keys for the section they sit in.

use rules_content::{CodeBlock, Outline};

use super::{infer_severity, slug};
use crate::rule::{ExtractedRule, RuleKind};

const PREVIEW_CHARS: usize = 50;

pub(super) fn extract(prefix: &str, outline: &Outline) -> Vec<ExtractedRule> {
    let mut rules = Vec::new();
    let mut pattern_ordinal = 0;

    for block in &outline.code_blocks {
        match block.language.as_str() {
            "regex" | "regexp" | "pattern" => {
                let pattern = block.content.trim();
                if pattern.is_empty() {
                    continue;
                }
                pattern_ordinal += 1;
                let description = pattern_description(block, pattern);
                let severity = infer_severity(&description);
                rules.push(
                    ExtractedRule::new(
                        format!("{prefix}_pattern_{pattern_ordinal}"),
                        RuleKind::Pattern,
                        description,
                    )
                    .with_pattern(pattern)
                    .with_severity(severity)
                    .at_line(block.line),
                );
            }
            "yaml" | "yml" => {
                let keys = top_level_keys(&block.content);
                if keys.is_empty() {
                    continue;
                }
                let section = block.heading.as_deref().unwrap_or("Document");
                let description = format!("Required frontmatter fields for {section}");
                let severity = infer_severity(&description);
                rules.push(
                    ExtractedRule::new(
                        format!("{prefix}_{}_frontmatter", slug(section)),
                        RuleKind::Frontmatter,
                        description,
                    )
                    .with_required(keys)
                    .with_severity(severity)
                    .at_line(block.line),
                );
            }
            _ => {}
        }
    }
    rules
}

/// The enclosing heading carries the intent ("Titles must not ..."), so it
/// leads the description when present.
fn pattern_description(block: &CodeBlock, pattern: &str) -> String {
    let preview: String = pattern.chars().take(PREVIEW_CHARS).collect();
    let ellipsis = if pattern.chars().count() > PREVIEW_CHARS { "..." } else { "" };
    match &block.heading {
        Some(heading) => format!("{heading}: {preview}{ellipsis}"),
        None => format!("Pattern validation: {preview}{ellipsis}"),
    }
}

fn top_level_keys(yaml: &str) -> Vec<String> {
    yaml.lines()
        .filter(|line| !line.starts_with(char::is_whitespace))
        .filter(|line| !line.starts_with('#') && !line.starts_with('-'))
        .filter_map(|line| line.split_once(':'))
        .map(|(key, _)| key.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
        .filter(|key| !key.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_yaml_block_lists_top_level_keys() {
        let outline = Outline::parse(
            "## Decision Frontmatter\n\n```yaml\ntitle: x\nstatus: draft\nowner:\n  name: nested\n# comment: no\n- item: no\n```\n",
        );
        let rules = extract("dec", &outline);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule_id, "dec_decision_frontmatter_frontmatter");
        assert_eq!(rules[0].required, vec!["title", "status", "owner"]);
        assert_eq!(rules[0].description, "Required frontmatter fields for Decision Frontmatter");
    }

    #[test]
    fn test_regex_blocks_are_numbered() {
        let outline = Outline::parse("```regex\n^A\n```\n\n```pattern\nB$\n```\n\n```rust\nfn x() {}\n```\n");
        let rules = extract("p", &outline);
        let ids: Vec<_> = rules.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["p_pattern_1", "p_pattern_2"]);
        assert_eq!(rules[0].pattern.as_deref(), Some("^A"));
        assert_eq!(rules[0].description, "Pattern validation: ^A");
    }

    #[test]
    fn test_heading_leads_pattern_description() {
        let outline = Outline::parse("## Lines must not contain TODO\n```regex\nTODO\n```\n");
        let rules = extract("p", &outline);
        assert_eq!(rules[0].description, "Lines must not contain TODO: TODO");
    }
}
