//! Tests for markdown outline scanning

use pretty_assertions::assert_eq;
use rules_content::Outline;

const RULES_BODY: &str = r#"# Decision Rules

## Frontmatter Requirements

| Field | Validation Rule | Example |
|-------|-----------------|---------|
| `title` | Must be present | `DEC-001: Adopt Rust` |
| `status` | Should be one of draft, accepted | `accepted` |

## Validation Rules

- Must include a title
- Should add examples
* May include diagrams

```regex
^DEC-\d{3}
```
"#;

#[test]
fn test_outline_collects_every_structure() {
    let outline = Outline::parse(RULES_BODY);

    let headings: Vec<_> = outline.heading_texts().collect();
    assert_eq!(
        headings,
        vec!["Decision Rules", "Frontmatter Requirements", "Validation Rules"]
    );

    assert_eq!(outline.tables.len(), 1);
    let table = &outline.tables[0];
    assert_eq!(table.headers, vec!["Field", "Validation Rule", "Example"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][0], "`title`");
    assert_eq!(table.line, 5);
    assert_eq!(table.heading.as_deref(), Some("Frontmatter Requirements"));
    assert_eq!(table.column("validation rule"), Some(1));
    assert_eq!(table.column("pattern"), None);

    let bullets: Vec<_> = outline.bullets.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(
        bullets,
        vec!["Must include a title", "Should add examples", "May include diagrams"]
    );
    assert!(
        outline
            .bullets
            .iter()
            .all(|b| b.heading.as_deref() == Some("Validation Rules"))
    );

    assert_eq!(outline.code_blocks.len(), 1);
    assert_eq!(outline.code_blocks[0].language, "regex");
    assert_eq!(outline.code_blocks[0].content, r"^DEC-\d{3}");
}

#[test]
fn test_bullets_report_line_numbers() {
    let outline = Outline::parse("intro\n\n- first\n  - nested\n");
    let lines: Vec<_> = outline.bullets.iter().map(|b| (b.text.as_str(), b.line)).collect();
    assert_eq!(lines, vec![("first", 3), ("nested", 4)]);
    assert!(outline.bullets[0].heading.is_none());
}

#[test]
fn test_table_without_separator_is_not_a_table() {
    let outline = Outline::parse("| a | b |\n| c | d |\n| e | f |\n");
    assert!(outline.tables.is_empty());
}
