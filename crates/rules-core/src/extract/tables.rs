//! Directives from markdown tables.
//!
//! A table qualifies when one of its headers names a rule column (field,
//! validation rule, pattern, requirement or rule). Each data row with at
//! least two cells becomes one directive.

use rules_content::{Outline, Table};

use super::{clean_cell, infer_severity, slug};
use crate::rule::{ExtractedRule, RuleKind};

const RULE_COLUMNS: [&str; 5] = ["field", "validation rule", "pattern", "requirement", "rule"];

pub(super) fn extract(prefix: &str, outline: &Outline) -> Vec<ExtractedRule> {
    outline
        .tables
        .iter()
        .filter(|table| is_rule_table(table))
        .flat_map(|table| rows(prefix, table))
        .collect()
}

fn is_rule_table(table: &Table) -> bool {
    table.headers.iter().any(|header| {
        let header = header.to_lowercase();
        RULE_COLUMNS.iter().any(|column| header.contains(column))
    })
}

fn rows(prefix: &str, table: &Table) -> Vec<ExtractedRule> {
    let field_col = table.column("field").or_else(|| table.column("pattern"));
    let rule_col = table
        .column("validation rule")
        .or_else(|| table.column("rule"))
        .or_else(|| table.column("requirement"));
    let example_col = table.column("example").or_else(|| table.column("pattern"));
    let severity_col = table.column("severity");

    let first_header = table.headers.first().map(|h| h.to_lowercase()).unwrap_or_default();
    let heading_mentions_frontmatter = table
        .heading
        .as_deref()
        .is_some_and(|h| h.to_lowercase().contains("frontmatter"));

    let mut rules = Vec::new();
    for (idx, row) in table.rows.iter().enumerate() {
        if row.len() < 2 {
            continue;
        }
        let cell = |col: Option<usize>, fallback: usize| {
            col.or(Some(fallback))
                .and_then(|c| row.get(c))
                .map(|c| clean_cell(c))
                .unwrap_or_default()
        };
        let field = cell(field_col, 0);
        let description = cell(rule_col, 1);
        if field.is_empty() && description.is_empty() {
            continue;
        }

        let is_frontmatter = field.to_lowercase().contains("frontmatter")
            || first_header.contains("field")
            || heading_mentions_frontmatter;

        let description = if description.is_empty() { field.clone() } else { description };
        let severity = severity_col
            .and_then(|c| row.get(c))
            .and_then(|s| clean_cell(s).parse().ok())
            .unwrap_or_else(|| infer_severity(&description));

        let rule_id = format!("{prefix}_{}", slug(&field));
        let line = table.line + 2 + idx;

        let rule = if is_frontmatter {
            ExtractedRule::new(rule_id, RuleKind::Frontmatter, description).with_required([field])
        } else {
            let mut rule = ExtractedRule::new(rule_id, RuleKind::Pattern, description);
            if let Some(pattern) = example_col
                .and_then(|c| row.get(c))
                .map(|c| clean_cell(c))
                .filter(|p| !p.is_empty())
            {
                rule = rule.with_pattern(pattern);
            }
            rule
        };
        rules.push(rule.with_severity(severity).at_line(line));
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_table_yields_frontmatter_rules() {
        let outline = Outline::parse(
            "| Field | Validation Rule | Example |\n|---|---|---|\n| `title` | Must be present | `x` |\n| `tags` | Should list topics | `[a]` |\n",
        );
        let rules = extract("quality", &outline);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].rule_id, "quality_title");
        assert_eq!(rules[0].kind, RuleKind::Frontmatter);
        assert_eq!(rules[0].required, vec!["title".to_string()]);
        assert_eq!(rules[0].severity, Severity::Error);
        assert_eq!(rules[0].line_number, Some(3));
        assert_eq!(rules[1].severity, Severity::Warning);
    }

    #[test]
    fn test_pattern_table_keeps_example_as_pattern() {
        let outline = Outline::parse(
            "| Pattern | Rule | Severity |\n|---|---|---|\n| `^# ` | Must start with a heading | warning |\n",
        );
        let rules = extract("docs", &outline);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].kind, RuleKind::Pattern);
        assert_eq!(rules[0].pattern.as_deref(), Some("^#"));
        assert_eq!(rules[0].severity, Severity::Warning);
    }

    #[test]
    fn test_unrelated_table_is_ignored() {
        let outline = Outline::parse("| Name | Owner |\n|---|---|\n| a | b |\n");
        assert!(extract("x", &outline).is_empty());
    }
}
