//! Filesystem layer for the rules service
//!
//! Normalized paths, content checksums with a modification-time keyed cache,
//! atomic write/copy, and format-agnostic config loading.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{ChecksumAlgorithm, FileHashCache};
pub use config::ConfigStore;
pub use constants::{CONFIG_FILE_NAME, RULES_GLOB, RULES_SUFFIX, is_rules_file_name};
pub use error::{Error, Result};
pub use path::NormalizedPath;
