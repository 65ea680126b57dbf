//
//  tea-cli
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration File I/O Module
//!
//! Low-level file operations for the login configuration: locating the file,
//! reading it, and replacing it atomically.
//!
//! ## Locations
//!
//! | Kind | Path |
//! |------|------|
//! | Preferred (Linux) | `~/.config/tea/config.yml` |
//! | Preferred (macOS) | `~/Library/Application Support/tea/config.yml` |
//! | Preferred (Windows) | `%APPDATA%\tea\config\config.yml` |
//! | Legacy, read-only | `~/.tea/tea.yml` |
//!
//! ## Notes
//!
//! - Writes go through a temporary file in the target directory which is
//!   flushed to disk and then renamed over the target, so a crash never leaves
//!   a half-written file behind.
//! - The file holds API tokens and is created with mode `0600` on unix.

use std::io::Write;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use tempfile::NamedTempFile;

use super::ConfigError;

/// File name of the preferred configuration file.
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Returns the preferred configuration path.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] when the platform has no notion of a
/// per-user configuration directory (for example, no `HOME`).
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("", "", crate::APP_NAME).ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Returns the legacy `~/.tea/tea.yml` path, if a home directory is known.
pub fn legacy_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".tea").join("tea.yml"))
}

/// Reads the whole configuration file into a string.
pub fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically replaces `path` with `content`.
///
/// Parent directories are created as needed. The temporary file lives next
/// to the target so the final rename never crosses a filesystem boundary.
pub fn write_config_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(io_err)?;

    let mut file = NamedTempFile::new_in(&parent).map_err(io_err)?;
    file.write_all(content.as_bytes()).map_err(io_err)?;
    file.as_file().sync_all().map_err(io_err)?;
    restrict_permissions(file.path()).map_err(io_err)?;
    file.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
