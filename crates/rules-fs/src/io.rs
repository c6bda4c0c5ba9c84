//! Atomic write and copy operations
//!
//! Both operations stage content in a hidden sibling file (same directory,
//! so the same filesystem), flush it under an exclusive lock and rename it
//! over the destination. The destination either keeps its previous bytes or
//! receives the complete new content.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

fn temp_sibling(target: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.tmp",
        target
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    target.with_file_name(temp_name)
}

/// Stage `source` into a temp sibling of `target`, then rename it into place.
///
/// The temp file is removed when any step fails.
fn replace_with(target: &Path, source: &mut dyn Read) -> Result<()> {
    let temp_path = temp_sibling(target);

    let result = stage(&temp_path, target, source)
        .and_then(|()| fs::rename(&temp_path, target).map_err(|e| Error::io(target, e)));

    if result.is_err() && temp_path.exists() {
        if let Err(e) = fs::remove_file(&temp_path) {
            tracing::warn!(path = %temp_path.display(), error = %e, "failed to remove staged file");
        }
    }
    result
}

fn stage(temp_path: &Path, target: &Path, source: &mut dyn Read) -> Result<()> {
    let lock_failed = || Error::LockFailed {
        path: target.to_path_buf(),
    };

    let mut staged = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    staged.lock_exclusive().map_err(|_| lock_failed())?;
    io::copy(source, &mut staged).map_err(|e| Error::io(temp_path, e))?;
    staged.flush().map_err(|e| Error::io(temp_path, e))?;
    staged.sync_all().map_err(|e| Error::io(temp_path, e))?;
    staged.unlock().map_err(|_| lock_failed())
}

/// Write `content` over `path`, creating parent directories as needed.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();
    if let Some(parent) = native_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    replace_with(&native_path, &mut &content[..])
}

/// Copy `source` over `target` atomically.
pub fn copy_atomic(source: &Path, target: &Path) -> Result<()> {
    let mut reader = File::open(source).map_err(|e| Error::io(source, e))?;
    replace_with(target, &mut reader)
}

pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
