//! Error types for rules-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] rules_fs::Error),

    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Invalid override for '{key}': {message}")]
    InvalidOverride { key: String, message: String },

    #[error("Invalid rule document {path}: {message}")]
    InvalidDocument { path: PathBuf, message: String },

    #[error("Unknown value '{value}' for {kind}")]
    UnknownVariant { kind: &'static str, value: String },
}
