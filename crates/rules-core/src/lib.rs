//! Rules pipeline for markdown document corpora
//!
//! This crate coordinates the lower layers into a single pipeline:
//!
//! - **Discovery**: scan a tree for `*.rules.md` documents ([`RuleDiscovery`])
//! - **Extraction**: turn document bodies into directives ([`RuleExtractor`])
//! - **Resolution**: index directives by target kind ([`RuleEngine`])
//! - **Validation**: check documents and remediate issues ([`ValidationService`])
//! - **Sync**: mirror the corpus into agent folders ([`SyncService`])
//!
//! # Architecture
//!
//! ```text
//!                 rules-core
//!                     |
//!      +--------------+--------------+
//!      |              |              |
//!  rules-fs     rules-content    rules-meta
//! ```
//!
//! # Example
//!
//! ```ignore
//! use rules_core::{RuleDiscovery, SyncService, ValidationService};
//! use rules_meta::RulesServiceConfig;
//!
//! fn example(root: &std::path::Path) -> rules_core::Result<()> {
//!     let mut discovery = RuleDiscovery::new(root)?;
//!     let (documents, _errors) = discovery.discover_rules(false);
//!
//!     let service = ValidationService::from_documents(&documents, &Default::default());
//!     let result = service.validate_file(root.join("decisions/adopt.decision.md"))?;
//!     println!("{} issues", result.issues.len());
//!
//!     let sync = SyncService::new(RulesServiceConfig::discover(root)?, root)?;
//!     let outcome = sync.sync_rules(&documents, true);
//!     println!("{} changes", outcome.total_changes());
//!     Ok(())
//! }
//! ```

pub mod comments;
pub mod detect;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod extract;
pub mod fixer;
pub mod issue;
pub mod logging;
pub mod rule;
pub mod sync;
pub mod validation;

pub use comments::{CommentInsertion, HumanInputComment, HumanInputCommentGenerator, Placement, Priority};
pub use detect::{DocumentKind, DocumentKindInfo, DocumentTypeDetector};
pub use discovery::{RuleDiscovery, RuleSortKey, Snapshot, TagQuery};
pub use engine::RuleEngine;
pub use error::{Error, Result};
pub use extract::{RuleExtractor, infer_severity};
pub use fixer::{AutoFixer, FixCategory, FixKind, FixLogEntry};
pub use issue::{IssueCategory, Severity, ValidationIssue, ValidationResult, ValidationSummary};
pub use rule::{ExtractedRule, RuleKind};
pub use sync::{FolderStatus, SyncAction, SyncResult, SyncService, SyncState};
pub use validation::{ValidateAndFixOutcome, ValidationService};
