//! Error types for rules-core

use std::path::PathBuf;

/// Result type for rules-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rules-core operations
///
/// Only construction and configuration problems surface here. Per-file
/// discovery, validation and sync failures are collected as messages in the
/// respective reports instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem error from rules-fs
    #[error(transparent)]
    Fs(#[from] rules_fs::Error),

    /// Model or configuration error from rules-meta
    #[error(transparent)]
    Meta(#[from] rules_meta::Error),

    /// Front-matter error from rules-content
    #[error(transparent)]
    Content(#[from] rules_content::Error),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Unknown sort key '{key}'")]
    InvalidSortKey { key: String },

    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Rules root is not a directory: {path}")]
    RootNotFound { path: PathBuf },
}
