//! Content checksums and the modification-time keyed hash cache
//!
//! Checksums use the canonical `<algorithm>:<hex>` format so values produced
//! with different algorithms never compare equal by accident.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

use crate::{Error, Result};

const CHUNK_SIZE: usize = 8192;

/// Hash algorithm used for content comparison during sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    #[default]
    #[serde(alias = "sha-256")]
    Sha256,
    #[serde(alias = "sha-512")]
    Sha512,
}

impl ChecksumAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Checksum of in-memory content.
    pub fn content_checksum(&self, content: &[u8]) -> String {
        match self {
            Self::Sha256 => self.format(Sha256::digest(content)),
            Self::Sha512 => self.format(Sha512::digest(content)),
        }
    }

    /// Checksum of a file, read in fixed-size chunks.
    pub fn file_checksum(&self, path: &Path) -> Result<String> {
        let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut hasher = StreamHasher::new(*self);
        let mut buffer = [0u8; CHUNK_SIZE];
        loop {
            let read = file.read(&mut buffer).map_err(|e| Error::io(path, e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }
        Ok(hasher.finish())
    }

    fn format(&self, digest: impl std::fmt::LowerHex) -> String {
        format!("{}:{:x}", self.as_str(), digest)
    }
}

enum StreamHasher {
    Sha256(Sha256),
    Sha512(Sha512),
}

impl StreamHasher {
    fn new(algorithm: ChecksumAlgorithm) -> Self {
        match algorithm {
            ChecksumAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            ChecksumAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(bytes),
            Self::Sha512(h) => h.update(bytes),
        }
    }

    fn finish(self) -> String {
        match self {
            Self::Sha256(h) => ChecksumAlgorithm::Sha256.format(h.finalize()),
            Self::Sha512(h) => ChecksumAlgorithm::Sha512.format(h.finalize()),
        }
    }
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha512" | "sha-512" => Ok(Self::Sha512),
            other => Err(Error::UnsupportedChecksum {
                algorithm: other.to_string(),
            }),
        }
    }
}

/// Memoized file hashes keyed by path.
///
/// An entry is reused only while the file's modification time matches the
/// one recorded with it. Entries are never evicted. The cache is shared by
/// reference across threads; the lock covers lookups and inserts only, so
/// files are hashed concurrently.
#[derive(Debug, Default)]
pub struct FileHashCache {
    algorithm: ChecksumAlgorithm,
    entries: Mutex<HashMap<PathBuf, (SystemTime, String)>>,
}

impl FileHashCache {
    pub fn new(algorithm: ChecksumAlgorithm) -> Self {
        Self {
            algorithm,
            entries: Mutex::default(),
        }
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, (SystemTime, String)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hash of the file at `path`, recomputed when its mtime has changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable.
    pub fn get_hash(&self, path: &Path) -> Result<String> {
        let modified = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|e| Error::io(path, e))?;

        if let Some((cached_mtime, hash)) = self.entries().get(path) {
            if *cached_mtime == modified {
                return Ok(hash.clone());
            }
        }

        let hash = self.algorithm.file_checksum(path)?;
        self.entries()
            .insert(path.to_path_buf(), (modified, hash.clone()));
        Ok(hash)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}
