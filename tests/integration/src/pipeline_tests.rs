//! End-to-end test of the rules pipeline
//!
//! Exercises the complete flow: config discovery -> rule discovery ->
//! validation -> in-place fix -> sync to agent folders -> status.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use rules_core::{
    DocumentKind, RuleDiscovery, SyncService, SyncState, ValidationService, ValidationSummary,
};
use rules_meta::{ConflictStrategy, RulesServiceConfig};
use rules_test_utils::fixtures::{DECISION_RULES_BODY, FLAWED_DECISION, VALID_DECISION};
use rules_test_utils::{RuleFile, TestCorpus};

const CONFIG: &str = r#"
version: "1.0"
agent_folders:
  - path: .cursor/rules
    description: Cursor rules
  - path: .claude/rules
    description: Claude rules
  - path: .vscode/rules
    enabled: false
sync:
  conflict_resolution: skip
  exclude_patterns: ["*.draft.rules.md"]
performance:
  max_parallel_operations: 2
  checksum_algorithm: sha512
"#;

fn setup() -> TestCorpus {
    let corpus = TestCorpus::new();
    corpus.write_config(CONFIG);
    corpus.write_rule(
        "os/rules/decisions.rules.md",
        &RuleFile::new("Decision Records")
            .applies_to(&["decision"])
            .tags(&["governance"])
            .body(DECISION_RULES_BODY),
    );
    corpus.write_rule(
        "os/rules/future.draft.rules.md",
        &RuleFile::new("Future Rules").tags(&["draft"]),
    );
    corpus.write_file("work/decisions/logging.decision.md", VALID_DECISION);
    corpus.write_file("work/decisions/queue.decision.md", FLAWED_DECISION);
    corpus
}

#[test]
fn test_full_pipeline() {
    let corpus = setup();
    let root = corpus.root();

    let config = RulesServiceConfig::discover(root).unwrap();
    assert_eq!(config.sync.conflict_strategy, ConflictStrategy::Skip);
    assert_eq!(config.enabled_folders().count(), 2);

    let mut discovery = RuleDiscovery::new(root).unwrap();
    let (documents, errors) = discovery.discover_rules(false);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(documents.len(), 2);

    // Validate both target documents
    let service = ValidationService::from_documents(&documents, &HashMap::new());
    let results = service.validate_files(&[
        corpus.path("work/decisions/logging.decision.md"),
        corpus.path("work/decisions/queue.decision.md"),
    ]);
    let summaries: Vec<ValidationSummary> = results
        .into_iter()
        .map(|r| r.unwrap().summary())
        .collect();
    assert!(summaries[0].is_valid);
    assert_eq!(summaries[1].document_kind, DocumentKind::Decision);
    assert_eq!(summaries[1].errors, 4);
    assert_eq!(summaries[1].auto_fixable, 3);

    let json = serde_json::to_value(&summaries[1]).unwrap();
    assert_eq!(json["document_kind"], "decision");

    // Fix the flawed document in place, the way a pre-commit hook would
    let target = corpus.path("work/decisions/queue.decision.md");
    let outcome = service.fix_file(&target, true, false).unwrap();
    assert!(outcome.is_modified());
    assert_eq!(corpus.read("work/decisions/queue.decision.md"), outcome.fixed_content);

    let rechecked = service.validate_file(&target).unwrap();
    assert_eq!(rechecked.issues.len(), 1);
    assert_eq!(rechecked.auto_fixable_count(), 0);
    corpus.assert_frontmatter_field("work/decisions/queue.decision.md", "owner", "PLACEHOLDER: Set owner");
    corpus.assert_frontmatter_field("work/decisions/queue.decision.md", "title", "Pick a queue");

    // Sync the corpus, excluding drafts
    let sync = SyncService::new(config, root).unwrap();
    let first = sync.sync_rules(&documents, false);
    assert!(first.is_success(), "{:?}", first.errors);
    assert_eq!(first.added, 2);
    assert_eq!(corpus.list_dir(".cursor/rules"), vec!["decisions.rules.md"]);
    corpus.assert_mirrored(".claude/rules", "os/rules/decisions.rules.md");
    assert!(!corpus.path(".vscode/rules").exists());

    let second = sync.sync_rules(&documents, false);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.total_changes(), 0);

    let status = sync.get_sync_status(&documents);
    assert_eq!(status[".cursor/rules/"].state, SyncState::InSync);
    assert_eq!(status[".claude/rules/"].rule_count, 1);
    assert_eq!(status[".vscode/rules/"].state, SyncState::NotInitialized);
}

#[test]
fn test_rescan_after_rule_edit() {
    let corpus = setup();
    let mut discovery = RuleDiscovery::new(corpus.root()).unwrap();
    discovery.discover_rules(false);

    corpus.write_rule(
        "os/rules/style.rules.md",
        &RuleFile::new("Style").tags(&["writing"]),
    );
    assert_eq!(discovery.discover_rules(false).0.len(), 2);
    assert_eq!(discovery.discover_rules(true).0.len(), 3);

    // Hidden agent folders never feed back into discovery
    let config = RulesServiceConfig::discover(corpus.root()).unwrap();
    let (documents, _) = discovery.discover_rules(false);
    SyncService::new(config, corpus.root())
        .unwrap()
        .sync_rules(&documents, false);
    assert_eq!(discovery.discover_rules(true).0.len(), 3);
}
