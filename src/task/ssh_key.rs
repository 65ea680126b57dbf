//
//  tea-cli
//  task/ssh_key.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Match local SSH keys against the keys registered on the forge.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::api::ForgeApi;
use crate::auth::public_key_fingerprint;
use crate::util::file_exists;

/// Finds a private key in `ssh_dir` whose public half is registered for the
/// authenticated user.
///
/// Every `*.pub` file with a private key next to it is a candidate. The
/// first match in file name order wins. A missing `ssh_dir` yields `None`.
pub async fn find_ssh_key(api: &dyn ForgeApi, ssh_dir: &Path) -> Result<Option<PathBuf>> {
    let registered: HashSet<String> = api
        .list_public_keys()
        .await
        .context("could not list the SSH keys of the user")?
        .into_iter()
        .filter_map(|key| {
            if key.fingerprint.is_empty() {
                public_key_fingerprint(&key.key).ok()
            } else {
                Some(key.fingerprint)
            }
        })
        .collect();
    if registered.is_empty() {
        return Ok(None);
    }

    let entries = match fs::read_dir(ssh_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("could not read {}", ssh_dir.display()))
        }
    };

    let mut public_keys: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "pub"))
        .collect();
    public_keys.sort();

    for public in public_keys {
        let private = public.with_extension("");
        if !file_exists(&private).unwrap_or(false) {
            continue;
        }
        let Ok(line) = fs::read_to_string(&public) else {
            continue;
        };
        match public_key_fingerprint(line.trim()) {
            Ok(fingerprint) if registered.contains(&fingerprint) => {
                debug!(key = %private.display(), %fingerprint, "found registered key");
                return Ok(Some(private));
            }
            Ok(_) => {}
            Err(e) => debug!(key = %public.display(), error = %e, "skipping public key"),
        }
    }
    Ok(None)
}
