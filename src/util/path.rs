//
//  tea-cli
//  util/path.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Filesystem path helpers.
//!
//! Existence checks here never fail on a path that merely does not exist,
//! including paths that try to descend through a regular file
//! (`/etc/hosts/foo`). Only genuine I/O failures such as permission errors
//! are reported.

use std::io;
use std::path::{Component, Path, PathBuf};

use directories::BaseDirs;

/// Replaces a leading `~` with the current user's home directory.
///
/// Paths that do not start with `~` (or `~/`) are returned unchanged, as is
/// everything when no home directory can be determined.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => rest,
        _ => return PathBuf::from(path),
    };
    match BaseDirs::new() {
        Some(dirs) => {
            let rest = rest.trim_start_matches(['/', '\\']);
            if rest.is_empty() {
                dirs.home_dir().to_path_buf()
            } else {
                dirs.home_dir().join(rest)
            }
        }
        None => PathBuf::from(path),
    }
}

/// Expands `~` and makes the path absolute against the working directory.
///
/// `.` and `..` components are folded lexically; symlinks are not resolved
/// and the path does not need to exist.
pub fn absolute_path(path: &str) -> io::Result<PathBuf> {
    let expanded = expand_home(path);
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

/// Returns `(exists, is_dir)` for `path`.
pub fn path_exists(path: &Path) -> io::Result<(bool, bool)> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok((true, meta.is_dir())),
        Err(err) if is_missing(&err) => Ok((false, false)),
        Err(err) => Err(err),
    }
}

/// Whether `path` exists and is a regular file (or a symlink to one).
pub fn file_exists(path: &Path) -> io::Result<bool> {
    let (exists, is_dir) = path_exists(path)?;
    Ok(exists && !is_dir)
}

/// Whether `path` exists and is a directory.
pub fn dir_exists(path: &Path) -> io::Result<bool> {
    let (exists, is_dir) = path_exists(path)?;
    Ok(exists && is_dir)
}

fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
