//
//  tea-cli
//  task/pull_clean.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Remove the branches of a closed pull request.

use anyhow::{Context, Result};
use tracing::info;

use super::{resolve_head_sha, transport_auth, TaskError};
use crate::api::gitea::StateType;
use crate::api::ForgeApi;
use crate::auth::PasswordPrompt;
use crate::config::Login;
use crate::context::LocalRepo;

/// Branch checked out when the repository reports no default branch.
const FALLBACK_DEFAULT_BRANCH: &str = "master";

/// What [`pull_clean`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOutcome {
    /// The local branch that was deleted.
    pub branch: String,
    /// Set when the deleted branch was checked out and HEAD moved here first.
    pub switched_to: Option<String>,
    /// `<remote>/<branch>` when the head branch was also deleted on the forge.
    pub remote_branch: Option<String>,
}

/// Deletes the local branch of a closed or merged pull request, and its head
/// branch on the forge when the user can push there.
///
/// The local branch is located by the head commit, or by the head branch
/// name when `ignore_sha` is set (useful after the local branch moved on).
///
/// # Errors
///
/// * [`TaskError::StillOpen`] for an open pull request; nothing is touched
/// * [`TaskError::BranchNotTracked`] when no local branch matches
#[allow(clippy::too_many_arguments)]
pub async fn pull_clean(
    api: &dyn ForgeApi,
    login: &Login,
    local: &LocalRepo,
    owner: &str,
    name: &str,
    index: i64,
    ignore_sha: bool,
    prompt: Option<PasswordPrompt<'_>>,
) -> Result<CleanOutcome> {
    let repo = api
        .get_repo(owner, name)
        .await
        .with_context(|| format!("could not fetch repository {owner}/{name}"))?;
    let default_branch = if repo.default_branch.is_empty() {
        FALLBACK_DEFAULT_BRANCH.to_string()
    } else {
        repo.default_branch
    };

    let pr = api
        .get_pull_request(owner, name, index)
        .await
        .with_context(|| format!("could not fetch pull request #{index}"))?;
    if pr.state == StateType::Open {
        return Err(TaskError::StillOpen.into());
    }
    let head_repo = pr
        .head
        .repo
        .as_ref()
        .ok_or(TaskError::MissingHeadRepo(index))?;
    let head_url = head_repo.git_url(login.has_ssh_key());

    // Once the head branch is gone the forge reports the pull ref instead;
    // the branch name survives in the label.
    let deleted_on_forge = pr.head.branch_deleted(index);
    let remote_branch = if deleted_on_forge {
        pr.head.name.clone()
    } else {
        pr.head.ref_name.clone()
    };

    let found = if ignore_sha {
        local.find_branch_by_name(&remote_branch, head_url)?
    } else {
        let sha = resolve_head_sha(api, owner, name, &pr).await?;
        local.find_branch_by_sha(&sha, head_url)?
    };
    let branch = found.ok_or_else(|| TaskError::BranchNotTracked {
        branch: remote_branch.clone(),
        ignore_sha,
    })?;

    let mut switched_to = None;
    if local.current_branch_name().ok().as_deref() == Some(branch.name.as_str()) {
        local
            .checkout(&default_branch)
            .with_context(|| format!("could not check out '{default_branch}'"))?;
        switched_to = Some(default_branch);
    }

    local.delete_local_branch(&branch)?;
    info!(branch = %branch.name, "deleted local branch");

    let mut deleted_remote = None;
    if !deleted_on_forge && head_repo.can_push() {
        let remote = local.remote(&branch.remote)?;
        let auth = transport_auth(remote.url().unwrap_or(head_url), login, prompt)?;
        local
            .delete_remote_branch(&branch.remote, &remote_branch, auth.as_ref(), login.insecure)
            .with_context(|| format!("could not delete {}/{remote_branch}", branch.remote))?;
        info!(remote = %branch.remote, branch = %remote_branch, "deleted remote branch");
        deleted_remote = Some(format!("{}/{remote_branch}", branch.remote));
    }

    Ok(CleanOutcome {
        branch: branch.name,
        switched_to,
        remote_branch: deleted_remote,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeForge;
    use crate::api::gitea::{PullRequest, Repository, User};
    use crate::context::git::tests::bare_mirror;
    use crate::task::pull_checkout::tests::{head_repo, pull, repo_with_feature};
    use git2::Repository as GitRepository;
    use tempfile::TempDir;

    struct Fixture {
        _dirs: Vec<TempDir>,
        bare: GitRepository,
        bare_url: String,
        local: LocalRepo,
        sha: String,
        forge: FakeForge,
    }

    /// A clone of a forge repository with `feature` checked out and tracking
    /// `origin/feature`.
    fn fixture() -> Fixture {
        let source_dir = TempDir::new().unwrap();
        let (source, sha) = repo_with_feature(source_dir.path());
        let bare_dir = TempDir::new().unwrap();
        let bare = bare_mirror(&source, bare_dir.path(), &["main", "feature"]);
        let bare_url = bare_dir.path().to_str().unwrap().to_string();

        let work_dir = TempDir::new().unwrap();
        let local = LocalRepo::clone(&bare_url, &work_dir.path().join("tea"), None, 0, false).unwrap();
        local
            .create_tracking_branch("feature", "feature", "origin")
            .unwrap();
        local.checkout("feature").unwrap();

        let forge = FakeForge::new("alice");
        forge.add_repo(Repository {
            owner: User {
                login: "gitea".to_string(),
                ..User::default()
            },
            name: "tea".to_string(),
            default_branch: "main".to_string(),
            ..Repository::default()
        });

        Fixture {
            _dirs: vec![source_dir, bare_dir, work_dir],
            bare,
            bare_url,
            local,
            sha: sha.to_string(),
            forge,
        }
    }

    fn closed_pull(f: &Fixture, push: bool) -> PullRequest {
        pull(7, StateType::Closed, head_repo("alice", &f.bare_url, push), &f.sha)
    }

    #[tokio::test]
    async fn test_clean_closed_pull() {
        let f = fixture();
        f.forge.add_pull("gitea", "tea", closed_pull(&f, true));

        let outcome = pull_clean(&f.forge, &Login::default(), &f.local, "gitea", "tea", 7, false, None)
            .await
            .unwrap();

        assert_eq!(outcome.branch, "feature");
        assert_eq!(outcome.switched_to.as_deref(), Some("main"));
        assert_eq!(outcome.remote_branch.as_deref(), Some("origin/feature"));
        assert_eq!(f.local.current_branch_name().unwrap(), "main");
        assert!(f.local.inner().find_reference("refs/heads/feature").is_err());
        assert_eq!(f.local.branch_config("feature").unwrap(), None);
        assert!(f.bare.find_reference("refs/heads/feature").is_err());
    }

    #[tokio::test]
    async fn test_clean_open_pull_is_refused() {
        let f = fixture();
        let mut pr = closed_pull(&f, true);
        pr.state = StateType::Open;
        f.forge.add_pull("gitea", "tea", pr);

        let err = pull_clean(&f.forge, &Login::default(), &f.local, "gitea", "tea", 7, false, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TaskError>(),
            Some(TaskError::StillOpen)
        ));
        assert_eq!(f.local.current_branch_name().unwrap(), "feature");
        assert!(f.bare.find_reference("refs/heads/feature").is_ok());
    }

    #[tokio::test]
    async fn test_clean_without_push_access_keeps_remote_branch() {
        let f = fixture();
        f.forge.add_pull("gitea", "tea", closed_pull(&f, false));

        let outcome = pull_clean(&f.forge, &Login::default(), &f.local, "gitea", "tea", 7, false, None)
            .await
            .unwrap();
        assert_eq!(outcome.remote_branch, None);
        assert!(f.local.inner().find_reference("refs/heads/feature").is_err());
        assert!(f.bare.find_reference("refs/heads/feature").is_ok());
    }

    #[tokio::test]
    async fn test_clean_branch_deleted_on_forge() {
        let f = fixture();
        let mut pr = closed_pull(&f, true);
        pr.head.ref_name = "refs/pull/7/head".to_string();
        pr.head.sha.clear();
        f.forge.add_pull("gitea", "tea", pr);

        let outcome = pull_clean(&f.forge, &Login::default(), &f.local, "gitea", "tea", 7, true, None)
            .await
            .unwrap();
        assert_eq!(outcome.branch, "feature");
        assert_eq!(outcome.remote_branch, None);
        assert!(f.bare.find_reference("refs/heads/feature").is_ok());
    }

    #[tokio::test]
    async fn test_clean_untracked_branch() {
        let f = fixture();
        let mut pr = closed_pull(&f, true);
        pr.head.sha = "0123456789012345678901234567890123456789".to_string();
        f.forge.add_pull("gitea", "tea", pr);

        let err = pull_clean(&f.forge, &Login::default(), &f.local, "gitea", "tea", 7, false, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TaskError>(),
            Some(TaskError::BranchNotTracked { ignore_sha: false, .. })
        ));
        assert!(f.local.inner().find_reference("refs/heads/feature").is_ok());
    }
}
