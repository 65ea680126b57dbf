//
//  tea-cli
//  task/clone.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Clone a forge repository, wiring a fork's parent as `upstream`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::transport_auth;
use crate::api::ForgeApi;
use crate::auth::PasswordPrompt;
use crate::config::Login;
use crate::context::{normalize_url, LocalRepo};

/// Name of the remote pointing at a fork's parent.
pub const UPSTREAM_REMOTE: &str = "upstream";

/// Clones `owner/name` from the forge of `login`.
///
/// # Arguments
///
/// * `path` - Target directory; empty clones into a directory named after the repository
/// * `depth` - History depth, `0` for the full history
///
/// # Returns
///
/// The cloned repository and the directory it was cloned into.
pub async fn clone_repo(
    api: &dyn ForgeApi,
    login: &Login,
    owner: &str,
    name: &str,
    path: &Path,
    depth: i32,
    prompt: Option<PasswordPrompt<'_>>,
) -> Result<(LocalRepo, PathBuf)> {
    let repo = api
        .get_repo(owner, name)
        .await
        .with_context(|| format!("could not fetch repository {owner}/{name}"))?;

    let prefer_ssh = login.has_ssh_key();
    let url = repo.git_url(prefer_ssh);
    let target = if path.as_os_str().is_empty() {
        PathBuf::from(&repo.name)
    } else {
        path.to_path_buf()
    };

    let auth = transport_auth(url, login, prompt)?;
    info!(url, path = %target.display(), "cloning");
    let local = LocalRepo::clone(url, &target, auth.as_ref(), depth, login.insecure)
        .with_context(|| format!("could not clone {url}"))?;

    if repo.fork {
        if let Some(parent) = &repo.parent {
            wire_upstream(&local, parent.git_url(prefer_ssh), &parent.default_branch)?;
        }
    }

    Ok((local, target))
}

/// Adds the `upstream` remote and makes the parent's default branch track it.
///
/// The branch is only re-pointed when the clone has a config entry for it,
/// which is the case when the fork and its parent share the default branch.
pub fn wire_upstream(local: &LocalRepo, parent_url: &str, default_branch: &str) -> Result<()> {
    let url = normalize_url(parent_url)?.to_string();
    local
        .create_remote(UPSTREAM_REMOTE, &url)
        .context("could not add upstream remote")?;
    debug!(%url, "added upstream remote");

    if !default_branch.is_empty() && local.branch_config(default_branch)?.is_some() {
        local.set_branch_upstream(
            default_branch,
            UPSTREAM_REMOTE,
            &format!("refs/heads/{default_branch}"),
        )?;
        debug!(branch = default_branch, "branch now tracks upstream");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeForge;
    use crate::api::gitea::{Repository, User};
    use crate::context::git::tests::{init_repo_at, init_test_repo};
    use tempfile::TempDir;

    fn repo(owner: &str, name: &str, clone_url: &str) -> Repository {
        Repository {
            owner: User {
                login: owner.to_string(),
                ..User::default()
            },
            name: name.to_string(),
            clone_url: clone_url.to_string(),
            default_branch: "main".to_string(),
            ..Repository::default()
        }
    }

    #[test]
    fn test_wire_upstream() {
        let (_temp, local) = init_test_repo();
        local
            .set_branch_upstream("main", "origin", "refs/heads/main")
            .unwrap();

        wire_upstream(&local, "https://host/up/x.git", "main").unwrap();

        assert_eq!(
            local.remote(UPSTREAM_REMOTE).unwrap().urls,
            vec!["https://host/up/x".to_string()]
        );
        assert_eq!(
            local.branch_config("main").unwrap(),
            Some(("upstream".to_string(), "refs/heads/main".to_string()))
        );
    }

    #[test]
    fn test_wire_upstream_without_branch_entry() {
        let (_temp, local) = init_test_repo();
        wire_upstream(&local, "git@host:up/x.git", "develop").unwrap();
        assert_eq!(
            local.remote(UPSTREAM_REMOTE).unwrap().url(),
            Some("ssh://git@host/up/x")
        );
        assert_eq!(local.branch_config("develop").unwrap(), None);
    }

    #[tokio::test]
    async fn test_clone_fork_sets_upstream() {
        let sources = TempDir::new().unwrap();
        let parent_path = sources.path().join("up");
        let fork_path = sources.path().join("me");
        std::fs::create_dir_all(&parent_path).unwrap();
        std::fs::create_dir_all(&fork_path).unwrap();
        init_repo_at(&parent_path);
        init_repo_at(&fork_path);

        let forge = FakeForge::new("me");
        let mut fork = repo("me", "x", fork_path.to_str().unwrap());
        fork.fork = true;
        fork.parent = Some(Box::new(repo("up", "x", parent_path.to_str().unwrap())));
        forge.add_repo(fork);

        let work = TempDir::new().unwrap();
        let target = work.path().join("x");
        let (local, path) = clone_repo(&forge, &Login::default(), "me", "x", &target, 0, None)
            .await
            .unwrap();

        assert_eq!(path, target);
        assert_eq!(local.current_branch_name().unwrap(), "main");
        assert_eq!(
            local.remote(UPSTREAM_REMOTE).unwrap().url(),
            parent_path.to_str()
        );
        assert_eq!(
            local.branch_config("main").unwrap(),
            Some(("upstream".to_string(), "refs/heads/main".to_string()))
        );
    }

    #[tokio::test]
    async fn test_clone_plain_repo() {
        let sources = TempDir::new().unwrap();
        init_repo_at(sources.path());

        let forge = FakeForge::new("me");
        forge.add_repo(repo("me", "plain", sources.path().to_str().unwrap()));

        let work = TempDir::new().unwrap();
        let target = work.path().join("plain");
        let (local, _) = clone_repo(&forge, &Login::default(), "me", "plain", &target, 0, None)
            .await
            .unwrap();
        assert!(local.remote(UPSTREAM_REMOTE).is_err());
        assert_eq!(
            local.branch_config("main").unwrap(),
            Some(("origin".to_string(), "refs/heads/main".to_string()))
        );

        assert!(
            clone_repo(&forge, &Login::default(), "me", "missing", &target, 0, None)
                .await
                .is_err()
        );
    }
}
