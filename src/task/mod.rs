//
//  tea-cli
//  task/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Forge Tasks
//!
//! Multi-step flows that combine forge API calls with local git operations.
//! Commands resolve a context, then call one task function with the pieces of
//! it the task needs.
//!
//! ## Tasks
//!
//! - [`clone_repo`]: clone a repository and wire the fork parent as `upstream`
//! - [`pull_checkout`]: check out a pull request head into a local branch
//! - [`pull_clean`]: delete the local and remote branch of a closed pull request
//! - [`pull_create`]: open a pull request from the current branch
//! - [`create_login`]: add a login, creating an API token when needed
//! - [`find_ssh_key`]: find the local private key registered on the forge
//!
//! Tasks never print. Anything the user should hear about comes back in the
//! returned outcome.

mod clone;
mod login;
mod pull_checkout;
mod pull_clean;
mod pull_create;
mod ssh_key;

pub use clone::*;
pub use login::*;
pub use pull_checkout::*;
pub use pull_clean::*;
pub use pull_create::*;
pub use ssh_key::*;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::api::gitea::PullRequest;
use crate::api::ForgeApi;
use crate::auth::{resolve_git_auth, GitAuth, PasswordPrompt};
use crate::config::Login;
use crate::context::normalize_url;
use crate::util::title_case;

/// Errors specific to forge tasks.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("PR is still open, won't delete branches")]
    StillOpen,

    #[error("no upstream found for branch '{0}'; push it first, e.g. `git push -u origin {0}`")]
    NoUpstream(String),

    #[error("could not resolve the head commit of pull request #{0}")]
    UnresolvablePrHead(i64),

    #[error("{}", branch_not_tracked(.branch, *.ignore_sha))]
    BranchNotTracked { branch: String, ignore_sha: bool },

    #[error("head and base are the same branch '{0}'")]
    SameHeadAndBase(String),

    #[error("the head repository of pull request #{0} no longer exists")]
    MissingHeadRepo(i64),
}

fn branch_not_tracked(branch: &str, ignore_sha: bool) -> String {
    let mut message = format!(
        "remote branch '{branch}' not found in local repo; either you don't track this PR, \
         or the local branch has diverged from the remote"
    );
    if !ignore_sha {
        message.push_str(
            "\nif you are sure no important commits get lost, run again with --ignore-sha",
        );
    }
    message
}

/// Transport authentication for a remote URL.
///
/// Local paths and `file://` URLs need none; everything else goes through
/// [`resolve_git_auth`].
pub fn transport_auth(
    url: &str,
    login: &Login,
    prompt: Option<PasswordPrompt<'_>>,
) -> Result<Option<GitAuth>> {
    let normalized = normalize_url(url)?;
    if normalized.scheme.is_empty() || normalized.scheme == "file" {
        return Ok(None);
    }
    let auth = resolve_git_auth(&normalized, login, prompt)
        .with_context(|| format!("no usable credentials for {url}"))?;
    Ok(Some(auth))
}

/// The head commit of `pr`.
///
/// Some server versions leave `head.sha` empty once the head branch is gone;
/// the commit is then looked up through the base repository's refs.
pub async fn resolve_head_sha(
    api: &dyn ForgeApi,
    owner: &str,
    name: &str,
    pr: &PullRequest,
) -> Result<String> {
    if !pr.head.sha.is_empty() {
        return Ok(pr.head.sha.clone());
    }

    let (owner, name) = match &pr.base.repo {
        Some(base) => (base.owner.login.as_str(), base.name.as_str()),
        None => (owner, name),
    };
    let refs = api.list_repo_refs(owner, name, &pr.head.ref_name).await?;
    refs.into_iter()
        .map(|r| r.object.sha)
        .find(|sha| !sha.is_empty())
        .ok_or_else(|| TaskError::UnresolvablePrHead(pr.number).into())
}

/// Pull request title derived from a head branch spec.
///
/// `alice:fix-login_page` becomes `Fix Login Page`.
pub fn derive_title(head: &str) -> String {
    let branch = head.split_once(':').map_or(head, |(_, branch)| branch);
    title_case(&branch.replace(['-', '_'], " "))
}
