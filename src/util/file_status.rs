//! File status probes used by the preflight validator.
//!
//! Thin wrappers over `std::fs::Metadata` plus, on Unix, `nix`'s `access(2)`
//! binding for real permission checks (metadata mode bits alone cannot
//! answer "can this process read it" once groups and ACLs are involved).

use std::fs;
use std::path::Path;

#[cfg(unix)]
use nix::unistd::{access, AccessFlags};

/// Returns `true` if `path` exists and is a directory.
pub fn is_directory(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Returns `true` if `path` exists and is a regular file.
pub fn is_reg_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Returns `true` if the calling process may read `path`.
#[cfg(unix)]
pub fn is_readable(path: &Path) -> bool {
    access(path, AccessFlags::R_OK).is_ok()
}

/// Returns `true` if the calling process may read `path`.
///
/// Without `access(2)` the best available signal is that the path exists;
/// Windows read permission is almost always granted to the owner.
#[cfg(not(unix))]
pub fn is_readable(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

/// Returns `true` if the calling process may write to `path`.
#[cfg(unix)]
pub fn is_writable(path: &Path) -> bool {
    access(path, AccessFlags::W_OK).is_ok()
}

/// Returns `true` if the calling process may write to `path`.
#[cfg(not(unix))]
pub fn is_writable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

/// Returns `true` if `path` is a directory containing no entries.
///
/// A read error counts as "not empty" so callers never remove a directory
/// they could not inspect.
pub fn is_dir_empty(path: &Path) -> bool {
    match fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => false,
    }
}
