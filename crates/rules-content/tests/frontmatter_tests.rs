//! Tests for front-matter splitting and parsing

use pretty_assertions::assert_eq;
use rstest::rstest;
use rules_content::{Error, Split, parse_mapping, read_frontmatter, split, split_strict};

#[rstest]
#[case("---\ntitle: Rules\nversion: 2\n---\nbody\n")]
#[case("+++\ntitle: Rules\nversion: 2\n+++\nbody\n")]
fn test_both_fences_parse(#[case] content: &str) {
    let map = read_frontmatter(content).unwrap();
    assert_eq!(map.get("title").and_then(|v| v.as_str()), Some("Rules"));
    assert_eq!(map.get("version").and_then(|v| v.as_u64()), Some(2));
}

#[test]
fn test_horizontal_rule_in_body_is_not_a_fence_problem() {
    let content = "---\ntitle: A\n---\nintro\n\n---\n\nmore\n";
    let block = split(content).block().unwrap();
    assert_eq!(block.body, "intro\n\n---\n\nmore\n");
}

#[test]
fn test_split_strict_reports_unclosed_block() {
    let err = split_strict("---\ntitle: A\n").unwrap_err();
    assert!(matches!(err, Error::MalformedFrontmatter { fence: "---" }));
    assert!(split_strict("plain text").unwrap().is_none());
}

#[test]
fn test_read_frontmatter_is_lenient() {
    assert!(read_frontmatter("no fence").is_none());
    assert!(read_frontmatter("---\n: [bad\n---\n").is_none());
    assert!(read_frontmatter("---\n---\n").is_none());
}

#[test]
fn test_split_absent_for_late_fence() {
    assert_eq!(split("\n---\ntitle: A\n---\n"), Split::Absent);
}

#[test]
fn test_parse_mapping_keeps_key_order() {
    let map = parse_mapping("zeta: 1\nalpha: 2\n").unwrap().unwrap();
    let keys: Vec<_> = map.keys().filter_map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["zeta", "alpha"]);
}
