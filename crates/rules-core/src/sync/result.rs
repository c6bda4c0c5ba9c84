//! Sync outcome types

use serde::{Deserialize, Serialize};

/// What happened (or would happen) to one target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Added,
    Updated,
    Skipped,
    Deleted,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Deleted => "deleted",
        }
    }
}

/// Counts for a sync run, mergeable across folders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    /// Per-file or per-folder failures; the rest of the run still proceeds.
    pub errors: Vec<String>,
    /// One line per file touched, prefixed with `[dry-run]` when nothing was written.
    pub actions: Vec<String>,
}

impl SyncResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }

    pub fn record(&mut self, action: SyncAction, target: &str, dry_run: bool) {
        match action {
            SyncAction::Added => self.added += 1,
            SyncAction::Updated => self.updated += 1,
            SyncAction::Skipped => self.skipped += 1,
            SyncAction::Deleted => self.deleted += 1,
        }
        if action != SyncAction::Skipped {
            let prefix = if dry_run { "[dry-run] " } else { "" };
            self.actions.push(format!("{prefix}{} {target}", action.as_str()));
        }
    }

    /// Fold `other` into this result.
    pub fn merge(&mut self, other: SyncResult) {
        self.added += other.added;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.skipped += other.skipped;
        self.errors.extend(other.errors);
        self.actions.extend(other.actions);
    }

    pub fn total_changes(&self) -> usize {
        self.added + self.updated + self.deleted
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
