//
//  tea-cli
//  cli/clone.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Clone a repository from a forge.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{ForgeConnector, GiteaConnector};
use crate::config::{ConfigStore, Login};
use crate::context::{normalize_url, ContextError, ContextResolver};
use crate::interactive::{can_prompt, prompt_password};
use crate::output::OutputWriter;
use crate::task::clone_repo;
use crate::util::absolute_path;

use super::GlobalOptions;

/// Clone a repository. Forks get their parent added as `upstream`.
#[derive(Args, Debug)]
pub struct CloneCommand {
    /// Repository as OWNER/NAME, NAME, or a clone URL
    pub repo: String,

    /// Target directory; defaults to the repository name
    pub path: Option<PathBuf>,

    /// Number of commits of history to fetch, 0 for all
    #[arg(long, short = 'd', default_value_t = 0)]
    pub depth: i32,
}

impl CloneCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let writer = OutputWriter::new(global.output);
        let store = ConfigStore::load()?;
        let (login, owner, name) = clone_target(&store, global, &self.repo)?;
        let api = GiteaConnector.connect_login(&login)?;

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message(format!("Cloning {owner}/{name}"));
        pb.enable_steady_tick(Duration::from_millis(100));

        let interactive = can_prompt();
        let ask = |message: &str| pb.suspend(|| prompt_password(message));
        let prompt: Option<&dyn Fn(&str) -> Result<String>> = if interactive { Some(&ask) } else { None };

        let path = clone_destination(self.path.as_deref())?;
        let result = clone_repo(api.as_ref(), &login, &owner, &name, &path, self.depth, prompt).await;
        pb.finish_and_clear();

        let (_, target) = result?;
        writer.write_success(&format!("Cloned {owner}/{name} into {}", target.display()));
        Ok(())
    }
}

/// Absolute target for an explicit path, with `~` expanded; empty when no
/// path was given so the clone lands in a directory named after the repository.
fn clone_destination(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(absolute_path(&path.to_string_lossy())?),
        None => Ok(PathBuf::new()),
    }
}

/// Login, owner and name for a clone argument.
///
/// A URL picks the login serving its host; anything else resolves like
/// `--repo`.
fn clone_target(
    store: &ConfigStore,
    global: &GlobalOptions,
    arg: &str,
) -> Result<(Login, String, String)> {
    if arg.contains("://") || arg.contains('@') {
        let url = normalize_url(arg)?;
        let repo = url
            .repo_ref()
            .ok_or_else(|| ContextError::InvalidSlug(arg.to_string()))?;
        let login = match global.login.as_deref() {
            Some(name) => store
                .get_by_name(name)
                .ok_or_else(|| ContextError::UnknownLogin(name.to_string()))?,
            None => store
                .logins()
                .iter()
                .find(|l| {
                    l.hostname().eq_ignore_ascii_case(url.hostname())
                        || l.ssh_host().eq_ignore_ascii_case(url.hostname())
                })
                .map_or_else(|| store.get_default(), Ok)
                .context("no login configured; run `tea login add` first")?,
        };
        return Ok((login.clone(), repo.owner, repo.name));
    }

    let options = GlobalOptions {
        repo: Some(arg.to_string()),
        ..global.clone()
    };
    let ctx = ContextResolver::new(store).resolve(&options)?;
    Ok((ctx.login, ctx.owner, ctx.name))
}
