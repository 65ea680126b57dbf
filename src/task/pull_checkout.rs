//
//  tea-cli
//  task/pull_checkout.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Check out the head of a pull request locally.

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{transport_auth, TaskError};
use crate::api::ForgeApi;
use crate::auth::PasswordPrompt;
use crate::config::Login;
use crate::context::{FetchOutcome, GitError, LocalRepo};

/// What [`pull_checkout`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    /// The local branch now checked out.
    pub branch: String,
    /// The remote the head was fetched from.
    pub remote: String,
    pub fetch: FetchOutcome,
    /// The branch existed before; it was checked out as is and may lag
    /// behind the remote.
    pub existed: bool,
}

/// Fetches the head of pull request `index` and checks it out.
///
/// A local branch already at the head commit is reused. Otherwise the branch
/// is named `pulls/<index>-<head ref>` and tracks the head branch on a remote
/// named `pulls/<head owner>`, which is created when no remote points at the
/// head repository yet.
pub async fn pull_checkout(
    api: &dyn ForgeApi,
    login: &Login,
    local: &LocalRepo,
    owner: &str,
    name: &str,
    index: i64,
    prompt: Option<PasswordPrompt<'_>>,
) -> Result<CheckoutOutcome> {
    let pr = api
        .get_pull_request(owner, name, index)
        .await
        .with_context(|| format!("could not fetch pull request #{index}"))?;
    let head_repo = pr
        .head
        .repo
        .as_ref()
        .ok_or(TaskError::MissingHeadRepo(index))?;
    let head_url = head_repo.git_url(login.has_ssh_key());

    let branch = match local.find_branch_by_sha(&pr.head.sha, head_url)? {
        Some(existing) => {
            debug!(branch = %existing.name, "found local branch at head commit");
            existing.name
        }
        None => format!("pulls/{index}-{}", pr.head.ref_name),
    };

    let remote = local.find_or_create_remote(head_url, &format!("pulls/{}", head_repo.owner.login))?;
    let auth = transport_auth(remote.url().unwrap_or(head_url), login, prompt)?;
    info!(remote = %remote.name, "fetching pull request head");
    let fetch = local
        .fetch(&remote.name, auth.as_ref(), login.insecure)
        .with_context(|| format!("could not fetch from remote '{}'", remote.name))?;

    let existed = match local.create_tracking_branch(&branch, &pr.head.ref_name, &remote.name) {
        Ok(_) => false,
        Err(GitError::BranchExists(_)) => true,
        Err(e) => return Err(e.into()),
    };

    local
        .checkout(&branch)
        .with_context(|| format!("could not check out '{branch}'"))?;

    Ok(CheckoutOutcome {
        branch,
        remote: remote.name,
        fetch,
        existed,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::fake::FakeForge;
    use crate::api::gitea::{Permission, PrBranchInfo, PullRequest, Repository, StateType, User};
    use crate::context::git::tests::{commit_file, init_repo_at, init_test_repo};
    use git2::build::CheckoutBuilder;
    use git2::Oid;
    use std::path::Path;
    use tempfile::TempDir;

    /// A repository on `main` with a `feature` branch one commit ahead.
    pub(crate) fn repo_with_feature(path: &Path) -> (LocalRepo, Oid) {
        let local = init_repo_at(path);
        let repo = local.inner();
        let base = repo.head().unwrap().peel_to_commit().unwrap();
        repo.branch("feature", &base, false).unwrap();
        repo.set_head("refs/heads/feature").unwrap();
        let oid = commit_file(repo, "feature.txt", "feature\n", "Add feature");
        repo.set_head("refs/heads/main").unwrap();
        repo.checkout_head(Some(CheckoutBuilder::new().force()))
            .unwrap();
        drop(base);
        (local, oid)
    }

    pub(crate) fn head_repo(owner: &str, clone_url: &str, push: bool) -> Repository {
        Repository {
            owner: User {
                login: owner.to_string(),
                ..User::default()
            },
            name: "tea".to_string(),
            clone_url: clone_url.to_string(),
            default_branch: "main".to_string(),
            permissions: Some(Permission {
                push,
                pull: true,
                ..Permission::default()
            }),
            ..Repository::default()
        }
    }

    pub(crate) fn pull(index: i64, state: StateType, head_repo: Repository, sha: &str) -> PullRequest {
        PullRequest {
            number: index,
            state,
            head: PrBranchInfo {
                name: "feature".to_string(),
                ref_name: "feature".to_string(),
                sha: sha.to_string(),
                repo: Some(head_repo),
                ..PrBranchInfo::default()
            },
            ..PullRequest::default()
        }
    }

    #[tokio::test]
    async fn test_checkout_creates_remote_and_branch() {
        let fork = TempDir::new().unwrap();
        let (_head, sha) = repo_with_feature(fork.path());
        let fork_url = fork.path().to_str().unwrap();

        let forge = FakeForge::new("bob");
        forge.add_pull(
            "gitea",
            "tea",
            pull(7, StateType::Open, head_repo("alice", fork_url, false), &sha.to_string()),
        );

        let (_temp, local) = init_test_repo();
        let login = Login::default();
        let outcome = pull_checkout(&forge, &login, &local, "gitea", "tea", 7, None)
            .await
            .unwrap();

        assert_eq!(outcome.branch, "pulls/7-feature");
        assert_eq!(outcome.remote, "pulls/alice");
        assert_eq!(outcome.fetch, FetchOutcome::Updated);
        assert!(!outcome.existed);
        assert_eq!(local.current_branch_name().unwrap(), "pulls/7-feature");
        assert_eq!(local.head_commit().unwrap(), sha);
        assert_eq!(
            local.branch_config("pulls/7-feature").unwrap(),
            Some(("pulls/alice".to_string(), "refs/heads/feature".to_string()))
        );

        // Running it again reuses the branch found at the head commit.
        local.checkout("main").unwrap();
        let again = pull_checkout(&forge, &login, &local, "gitea", "tea", 7, None)
            .await
            .unwrap();
        assert_eq!(again.branch, "pulls/7-feature");
        assert_eq!(again.fetch, FetchOutcome::UpToDate);
        assert!(again.existed);
        assert_eq!(local.current_branch_name().unwrap(), "pulls/7-feature");
    }

    #[tokio::test]
    async fn test_checkout_reuses_matching_remote() {
        let fork = TempDir::new().unwrap();
        let (_head, sha) = repo_with_feature(fork.path());
        let fork_url = fork.path().to_str().unwrap();

        let forge = FakeForge::new("bob");
        forge.add_pull(
            "gitea",
            "tea",
            pull(2, StateType::Open, head_repo("alice", fork_url, false), &sha.to_string()),
        );

        let (_temp, local) = init_test_repo();
        local.create_remote("fork", fork_url).unwrap();
        let outcome = pull_checkout(&forge, &Login::default(), &local, "gitea", "tea", 2, None)
            .await
            .unwrap();
        assert_eq!(outcome.remote, "fork");
        assert!(local.remote("pulls/alice").is_err());
    }

    #[tokio::test]
    async fn test_checkout_without_head_repo() {
        let forge = FakeForge::new("bob");
        let mut pr = pull(4, StateType::Open, Repository::default(), "");
        pr.head.repo = None;
        forge.add_pull("gitea", "tea", pr);

        let (_temp, local) = init_test_repo();
        let err = pull_checkout(&forge, &Login::default(), &local, "gitea", "tea", 4, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TaskError>(),
            Some(TaskError::MissingHeadRepo(4))
        ));
        assert_eq!(local.current_branch_name().unwrap(), "main");
    }
}
