//! Document validation and remediation
//!
//! [`ValidationService`] ties the pipeline together: it extracts rules from
//! rule documents into a [`RuleEngine`], checks documents against the rules
//! for their detected kind, and drives the [`AutoFixer`] and
//! [`HumanInputCommentGenerator`] over the resulting issues.

mod checks;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use regex::Regex;
use rules_fs::NormalizedPath;
use rules_meta::RuleDocument;
use serde::{Deserialize, Serialize};

use crate::comments::{CommentInsertion, HumanInputCommentGenerator};
use crate::detect::DocumentTypeDetector;
use crate::engine::RuleEngine;
use crate::extract::RuleExtractor;
use crate::fixer::{AutoFixer, FixLogEntry};
use crate::issue::{ValidationIssue, ValidationResult};
use crate::rule::RuleKind;
use crate::Result;

use checks::Document;

/// Everything `validate_and_fix` produced for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateAndFixOutcome {
    /// Result for the content as it was passed in.
    pub validation: ValidationResult,
    pub original_content: String,
    /// Content after fixes and comments; equal to the original when neither ran.
    pub fixed_content: String,
    pub fix_log: Vec<FixLogEntry>,
    pub comment_log: Vec<CommentInsertion>,
    /// Issues still present after fixing.
    pub remaining: Vec<ValidationIssue>,
}

impl ValidateAndFixOutcome {
    pub fn is_modified(&self) -> bool {
        self.fixed_content != self.original_content
    }

    pub fn fixes_applied(&self) -> usize {
        self.fix_log.iter().filter(|e| e.success).count()
    }
}

pub struct ValidationService {
    engine: RuleEngine,
    /// Compiled pattern rules by rule id; rules with invalid patterns are absent.
    patterns: HashMap<String, Regex>,
    detector: DocumentTypeDetector,
    fixer: AutoFixer,
    comments: HumanInputCommentGenerator,
}

impl ValidationService {
    pub fn new(engine: RuleEngine) -> Self {
        let patterns = engine
            .rules_of_kind(RuleKind::Pattern)
            .filter_map(|rule| {
                let pattern = rule.pattern.as_deref()?;
                match Regex::new(pattern) {
                    Ok(regex) => Some((rule.rule_id.clone(), regex)),
                    Err(e) => {
                        tracing::warn!(rule_id = %rule.rule_id, error = %e, "skipping rule with invalid pattern");
                        None
                    }
                }
            })
            .collect();

        Self {
            engine,
            patterns,
            detector: DocumentTypeDetector::new(),
            fixer: AutoFixer::new(),
            comments: HumanInputCommentGenerator::new(),
        }
    }

    /// Build from rule documents. Bodies come from `contents` when present,
    /// otherwise from disk; a document whose body cannot be read is skipped.
    pub fn from_documents(documents: &[RuleDocument], contents: &HashMap<PathBuf, String>) -> Self {
        let extractor = RuleExtractor::new();
        let mut rules = Vec::new();

        for document in documents {
            let owned;
            let content = match contents.get(&document.file_path) {
                Some(content) => content.as_str(),
                None => match std::fs::read_to_string(&document.file_path) {
                    Ok(text) => {
                        owned = text;
                        owned.as_str()
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %document.file_path.display(),
                            error = %e,
                            "could not read rule document, skipping"
                        );
                        continue;
                    }
                },
            };
            rules.extend(extractor.extract(document, content));
        }

        let engine = RuleEngine::new(rules);
        tracing::info!(documents = documents.len(), rules = engine.len(), "rule engine ready");
        Self::new(engine)
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn validate_document(&self, path: &Path, content: &str) -> ValidationResult {
        let started = Instant::now();
        let kind = self.detector.detect(path);
        let rules = self.engine.rules_for(kind);
        let document = Document::new(path, content);

        let mut issues = Vec::new();
        for rule in &rules {
            for mut issue in document.check(rule, &self.patterns) {
                issue.auto_fixable = self.fixer.can_fix(&issue);
                issues.push(issue);
            }
        }

        tracing::debug!(
            path = %path.display(),
            kind = %kind,
            rules = rules.len(),
            issues = issues.len(),
            "validated document"
        );
        ValidationResult {
            file_path: path.to_path_buf(),
            document_kind: kind,
            issues,
            rules_checked: rules.len(),
            elapsed: started.elapsed(),
        }
    }

    /// # Errors
    ///
    /// Returns an error when the file cannot be read.
    pub fn validate_file(&self, path: impl AsRef<Path>) -> Result<ValidationResult> {
        let path = path.as_ref();
        let content = rules_fs::io::read_text(&NormalizedPath::new(path))?;
        Ok(self.validate_document(path, &content))
    }

    /// Validate many files in parallel; results keep the input order.
    pub fn validate_files(&self, paths: &[PathBuf]) -> Vec<Result<ValidationResult>> {
        paths.par_iter().map(|path| self.validate_file(path)).collect()
    }

    /// Apply fixes for the auto-fixable subset of `issues`.
    pub fn auto_fix_document(&self, content: &str, issues: &[ValidationIssue]) -> (String, Vec<FixLogEntry>) {
        let fixable: Vec<ValidationIssue> = issues.iter().filter(|i| i.auto_fixable).cloned().collect();
        if fixable.is_empty() {
            return (content.to_string(), Vec::new());
        }
        self.fixer.apply(content, &fixable)
    }

    /// Comment the issues that auto-fix cannot resolve.
    pub fn add_human_input_comments(
        &self,
        content: &str,
        issues: &[ValidationIssue],
    ) -> (String, Vec<CommentInsertion>) {
        let manual: Vec<ValidationIssue> = issues.iter().filter(|i| !i.auto_fixable).cloned().collect();
        self.comments.insert_comments_in_content(content, &manual)
    }

    pub fn validate_and_fix(&self, path: &Path, content: &str, auto_fix: bool, add_comments: bool) -> ValidateAndFixOutcome {
        let validation = self.validate_document(path, content);
        let mut fixed = content.to_string();
        let mut fix_log = Vec::new();
        let mut comment_log = Vec::new();
        let mut remaining = validation.issues.clone();

        if auto_fix && validation.auto_fixable_count() > 0 {
            let (text, log) = self.auto_fix_document(content, &validation.issues);
            if log.iter().any(|entry| entry.success) {
                remaining = self.validate_document(path, &text).issues;
            }
            fixed = text;
            fix_log = log;
        }

        if add_comments && !remaining.is_empty() {
            let (text, log) = self.comments.insert_comments_in_content(&fixed, &remaining);
            fixed = text;
            comment_log = log;
        }

        ValidateAndFixOutcome {
            validation,
            original_content: content.to_string(),
            fixed_content: fixed,
            fix_log,
            comment_log,
            remaining,
        }
    }

    /// Run [`validate_and_fix`](Self::validate_and_fix) on a file and write
    /// the result back in place.
    ///
    /// The file is only rewritten when the content changed; the write is
    /// atomic, so a failure leaves the previous content intact.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or written.
    pub fn fix_file(&self, path: impl AsRef<Path>, auto_fix: bool, add_comments: bool) -> Result<ValidateAndFixOutcome> {
        let path = path.as_ref();
        let target = NormalizedPath::new(path);
        let content = rules_fs::io::read_text(&target)?;
        let outcome = self.validate_and_fix(path, &content, auto_fix, add_comments);

        if outcome.is_modified() {
            rules_fs::io::write_text(&target, &outcome.fixed_content)?;
            tracing::info!(
                path = %target,
                fixes = outcome.fixes_applied(),
                comments = outcome.comment_log.len(),
                "rewrote document"
            );
        }
        Ok(outcome)
    }
}
