//! Error types for rules-content

/// Result type for rules-content operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("front-matter opened with {fence} but never closed")]
    MalformedFrontmatter { fence: &'static str },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front-matter is not a string-keyed mapping")]
    NotAMapping,
}
