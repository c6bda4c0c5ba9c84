//! Per-folder sync status

use serde::{Deserialize, Serialize};

/// Coarse state of one target folder, judged by file counts only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// The target directory does not exist.
    NotInitialized,
    InSync,
    OutOfSync,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderStatus {
    pub description: String,
    pub enabled: bool,
    pub exists: bool,
    /// Rule files currently present in the target.
    pub rule_count: usize,
    /// Rule files the current corpus would place there.
    pub expected_count: usize,
    pub state: SyncState,
}

impl FolderStatus {
    /// `matching` is how many expected names are present in the target.
    pub fn evaluate(exists: bool, rule_count: usize, expected_count: usize, matching: usize) -> SyncState {
        if !exists {
            SyncState::NotInitialized
        } else if matching == expected_count && expected_count == rule_count {
            SyncState::InSync
        } else {
            SyncState::OutOfSync
        }
    }
}
