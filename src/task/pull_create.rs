//
//  tea-cli
//  task/pull_create.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Open a pull request, defaulting head and base from the working copy.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{derive_title, TaskError};
use crate::api::gitea::{CreatePullRequestOption, PullRequest};
use crate::api::ForgeApi;
use crate::context::{normalize_url, ContextError, LocalRepo};

/// Options for [`pull_create`]. Empty fields are filled in from the
/// repository and the working copy.
#[derive(Debug, Clone, Default)]
pub struct PullCreateOptions {
    /// Target branch; defaults to the repository's default branch.
    pub base: String,
    /// `branch` or `owner:branch`; defaults to the current branch.
    pub head: String,
    /// Defaults to a title derived from the head branch name.
    pub title: String,
    pub description: String,
    pub assignees: Vec<String>,
    pub labels: Vec<i64>,
    pub milestone: i64,
    pub deadline: Option<DateTime<Utc>>,
}

/// Creates a pull request on `owner/name`.
///
/// Without an explicit head the current branch is used, qualified with the
/// owner of the remote it was pushed to when that is not `owner`.
///
/// # Errors
///
/// * [`TaskError::NoUpstream`] when the current branch is on no remote
/// * [`TaskError::SameHeadAndBase`] when head and base name the same branch
pub async fn pull_create(
    api: &dyn ForgeApi,
    local: Option<&LocalRepo>,
    owner: &str,
    name: &str,
    options: PullCreateOptions,
) -> Result<PullRequest> {
    let base = if options.base.is_empty() {
        api.get_repo(owner, name)
            .await
            .with_context(|| format!("could not fetch repository {owner}/{name}"))?
            .default_branch
    } else {
        options.base
    };

    let head = if options.head.is_empty() {
        let local = local.ok_or(ContextError::LocalRepoRequired)?;
        head_from_working_copy(local, owner)?
    } else {
        options.head
    };

    if head == base {
        return Err(TaskError::SameHeadAndBase(head).into());
    }

    let title = if options.title.is_empty() {
        derive_title(&head)
    } else {
        options.title
    };

    debug!(%head, %base, "creating pull request");
    let option = CreatePullRequestOption {
        head,
        base,
        title,
        body: options.description,
        assignees: options.assignees,
        labels: options.labels,
        milestone: options.milestone,
        deadline: options.deadline,
    };
    let pr = api
        .create_pull_request(owner, name, &option)
        .await
        .context("could not create pull request")?;
    Ok(pr)
}

fn head_from_working_copy(local: &LocalRepo, owner: &str) -> Result<String> {
    let branch = local.current_branch_name()?;
    let sha = local.head_commit()?.to_string();
    let remote = local
        .find_branch_remote(&branch, &sha)?
        .ok_or_else(|| TaskError::NoUpstream(branch.clone()))?;
    let url = remote
        .url()
        .ok_or_else(|| TaskError::NoUpstream(branch.clone()))?;

    let head_owner = normalize_url(url)?
        .repo_ref()
        .map(|r| r.owner)
        .ok_or_else(|| anyhow!("cannot tell the owner of remote '{}' from {url}", remote.name))?;

    if head_owner.eq_ignore_ascii_case(owner) {
        Ok(branch)
    } else {
        Ok(format!("{head_owner}:{branch}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeForge;
    use crate::api::gitea::{Repository, User};
    use crate::context::git::tests::init_test_repo;
    use tempfile::TempDir;

    fn forge() -> FakeForge {
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
        forge
    }

    fn on_branch(remote_url: &str, branch: &str) -> (TempDir, LocalRepo) {
        let (temp, local) = init_test_repo();
        local.create_remote("origin", remote_url).unwrap();
        {
            let commit = local.inner().head().unwrap().peel_to_commit().unwrap();
            local.inner().branch(branch, &commit, false).unwrap();
        }
        local.checkout(branch).unwrap();
        (temp, local)
    }

    #[tokio::test]
    async fn test_create_from_fork_branch() {
        let forge = forge();
        let (_temp, local) = on_branch("https://gitea.com/alice/tea.git", "fix-login_page");

        let pr = pull_create(&forge, Some(&local), "gitea", "tea", PullCreateOptions::default())
            .await
            .unwrap();
        assert_eq!(pr.html_url, "https://forge.test/gitea/tea/pulls/1");

        let created = forge.created_pulls();
        assert_eq!(created.len(), 1);
        let (slug, option) = &created[0];
        assert_eq!(slug, "gitea/tea");
        assert_eq!(option.head, "alice:fix-login_page");
        assert_eq!(option.base, "main");
        assert_eq!(option.title, "Fix Login Page");
    }

    #[tokio::test]
    async fn test_create_from_same_owner_branch() {
        let forge = forge();
        let (_temp, local) = on_branch("git@gitea.com:gitea/tea.git", "feature");

        let options = PullCreateOptions {
            title: "Custom".to_string(),
            description: "Body".to_string(),
            labels: vec![3],
            milestone: 2,
            ..PullCreateOptions::default()
        };
        pull_create(&forge, Some(&local), "gitea", "tea", options)
            .await
            .unwrap();

        let (_, option) = &forge.created_pulls()[0];
        assert_eq!(option.head, "feature");
        assert_eq!(option.title, "Custom");
        assert_eq!(option.body, "Body");
        assert_eq!(option.labels, vec![3]);
        assert_eq!(option.milestone, 2);
    }

    #[tokio::test]
    async fn test_create_same_head_and_base() {
        let forge = forge();
        let (_temp, local) = init_test_repo();
        local
            .create_remote("origin", "https://gitea.com/gitea/tea")
            .unwrap();

        let err = pull_create(&forge, Some(&local), "gitea", "tea", PullCreateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TaskError>(),
            Some(TaskError::SameHeadAndBase(b)) if b == "main"
        ));
        assert!(forge.created_pulls().is_empty());
    }

    #[tokio::test]
    async fn test_create_branch_on_no_remote() {
        let forge = forge();
        let (_temp, local) = on_branch("https://gitea.com/alice/tea", "feature");
        local
            .create_remote("upstream", "https://gitea.com/gitea/tea")
            .unwrap();

        let err = pull_create(&forge, Some(&local), "gitea", "tea", PullCreateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TaskError>(),
            Some(TaskError::NoUpstream(b)) if b == "feature"
        ));
    }

    #[tokio::test]
    async fn test_create_with_explicit_head_needs_no_repo() {
        let forge = forge();
        let options = PullCreateOptions {
            head: "bob:docs".to_string(),
            base: "release".to_string(),
            ..PullCreateOptions::default()
        };
        pull_create(&forge, None, "gitea", "tea", options)
            .await
            .unwrap();
        let (_, option) = &forge.created_pulls()[0];
        assert_eq!(option.head, "bob:docs");
        assert_eq!(option.base, "release");
        assert_eq!(option.title, "Docs");

        let err = pull_create(&forge, None, "gitea", "tea", PullCreateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ContextError>(),
            Some(ContextError::LocalRepoRequired)
        ));
    }
}
