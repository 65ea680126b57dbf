//
//  tea-cli
//  context/git.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Git Repository Operations
//!
//! This module wraps the `git2` library with the operations the CLI needs on
//! a local working copy.
//!
//! ## Overview
//!
//! The [`LocalRepo`] struct provides:
//! - Opening repositories (explicit path or upward discovery)
//! - Read-only views of remotes, references and HEAD
//! - Locating the local branch that tracks a pull request, by commit or by name
//! - Creating tracking branches, checking out, deleting local and remote branches
//! - Fetch and clone with transport authentication
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tea_cli::context::LocalRepo;
//!
//! let repo = LocalRepo::open(Path::new(""))?;
//! println!("On branch {}", repo.current_branch_name()?);
//! for remote in repo.remotes()? {
//!     println!("{} -> {:?}", remote.name, remote.urls);
//! }
//! # Ok::<(), tea_cli::context::GitError>(())
//! ```
//!
//! ## Notes
//!
//! - All writes go through libgit2; no file under `.git` is edited directly.
//! - Branch configuration is written to the repository level config only.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::{Path, PathBuf};

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{ConfigLevel, ErrorCode, FetchOptions, ObjectType, Oid, PushOptions, Repository};
use thiserror::Error;
use tracing::debug;

use super::url::normalize_url;
use crate::auth::{remote_callbacks, GitAuth};

/// Errors raised by local repository operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// No repository exists at (or above) the given path.
    #[error("{} is not a git repository", .path.display())]
    NotARepository { path: PathBuf },

    /// HEAD does not point at a branch.
    #[error("HEAD is detached; check out a branch first")]
    DetachedHead,

    /// A branch with this name already exists locally.
    #[error("branch '{0}' already exists")]
    BranchExists(String),

    /// Refusing to delete the branch the working tree is on.
    #[error("branch '{0}' is checked out; check out another branch first")]
    BranchCheckedOut(String),

    /// No remote with this name is configured.
    #[error("remote '{0}' not found")]
    RemoteNotFound(String),

    /// The remote refused a pushed ref update.
    #[error("push rejected: {0}")]
    PushRejected(String),

    /// Any other libgit2 failure.
    #[error(transparent)]
    Git(#[from] git2::Error),
}

/// A configured remote with every URL it lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub name: String,
    pub urls: Vec<String>,
}

impl RemoteInfo {
    /// The first configured URL.
    pub fn url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }
}

/// A reference name and the commit it points at directly.
///
/// Symbolic references such as `refs/remotes/origin/HEAD` have no target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefInfo {
    pub name: String,
    pub target: Option<Oid>,
}

impl RefInfo {
    pub fn is_branch(&self) -> bool {
        self.name.starts_with("refs/heads/")
    }

    /// Name without the `refs/heads/`, `refs/remotes/` or `refs/tags/` prefix.
    pub fn short_name(&self) -> &str {
        ["refs/heads/", "refs/remotes/", "refs/tags/"]
            .iter()
            .find_map(|prefix| self.name.strip_prefix(prefix))
            .unwrap_or(&self.name)
    }
}

/// A local branch and what it tracks.
///
/// `remote` is empty for a branch that was never given an upstream (pushed
/// without `-u`). `merge` is the upstream ref, e.g. `refs/heads/feature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub remote: String,
    pub merge: String,
}

/// What a fetch changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// At least one remote-tracking ref moved.
    Updated,
    /// Nothing changed on the remote since the last fetch.
    UpToDate,
}

/// A working copy opened through libgit2.
pub struct LocalRepo {
    repo: Repository,
}

impl fmt::Debug for LocalRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalRepo")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl LocalRepo {
    /// Opens the repository at `path`, or discovers it upward from the
    /// current directory when `path` is empty.
    ///
    /// # Errors
    ///
    /// [`GitError::NotARepository`] when no repository is found.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        if path.as_os_str().is_empty() {
            return Self::discover(Path::new("."));
        }
        Repository::open(path)
            .map(|repo| Self { repo })
            .map_err(|e| not_a_repo(e, path))
    }

    /// Opens the repository containing `path`, walking up the directory tree.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        Repository::discover(path)
            .map(|repo| Self { repo })
            .map_err(|e| not_a_repo(e, path))
    }

    /// Wraps an already opened `git2` repository.
    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    /// The underlying `git2` repository.
    pub fn inner(&self) -> &Repository {
        &self.repo
    }

    /// Root of the working tree, `None` for bare repositories.
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// All configured remotes.
    pub fn remotes(&self) -> Result<Vec<RemoteInfo>, GitError> {
        let names = self.repo.remotes()?;
        names
            .iter()
            .flatten()
            .map(|name| self.remote(name))
            .collect()
    }

    /// Looks up one remote by name.
    pub fn remote(&self, name: &str) -> Result<RemoteInfo, GitError> {
        let remote = self.repo.find_remote(name).map_err(|e| match e.code() {
            ErrorCode::NotFound | ErrorCode::InvalidSpec => GitError::RemoteNotFound(name.to_string()),
            _ => GitError::Git(e),
        })?;

        let mut urls = Vec::new();
        let config = self.repo.config()?;
        config
            .multivar(&format!("remote.{name}.url"), None)?
            .for_each(|entry| {
                if let Some(value) = entry.value() {
                    urls.push(value.to_string());
                }
            })?;
        if urls.is_empty() {
            urls.extend(remote.url().map(str::to_string));
        }

        Ok(RemoteInfo {
            name: name.to_string(),
            urls,
        })
    }

    /// All references with their direct targets.
    pub fn references(&self) -> Result<Vec<RefInfo>, GitError> {
        let mut refs = Vec::new();
        for reference in self.repo.references()? {
            let reference = reference?;
            if let Some(name) = reference.name() {
                refs.push(RefInfo {
                    name: name.to_string(),
                    target: reference.target(),
                });
            }
        }
        Ok(refs)
    }

    /// The reference HEAD resolves to.
    pub fn head(&self) -> Result<RefInfo, GitError> {
        let head = self.repo.head()?;
        Ok(RefInfo {
            name: head.name().unwrap_or("HEAD").to_string(),
            target: head.target(),
        })
    }

    /// Commit id HEAD points at.
    pub fn head_commit(&self) -> Result<Oid, GitError> {
        Ok(self.repo.head()?.peel_to_commit()?.id())
    }

    /// Short name of the checked out branch.
    ///
    /// A freshly initialized repository whose branch has no commits yet still
    /// reports the branch name.
    ///
    /// # Errors
    ///
    /// [`GitError::DetachedHead`] when HEAD is not a branch.
    pub fn current_branch_name(&self) -> Result<String, GitError> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().unwrap_or_default().to_string()),
            Ok(_) => Err(GitError::DetachedHead),
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                head.symbolic_target()
                    .and_then(|t| t.strip_prefix("refs/heads/"))
                    .map(str::to_string)
                    .ok_or(GitError::DetachedHead)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Finds the remote whose URL addresses the same repository as `url`.
    ///
    /// URLs are compared after normalization on host and path, so
    /// `git@host:o/r.git` matches `https://host/o/r`.
    pub fn find_remote(&self, url: &str) -> Result<Option<RemoteInfo>, GitError> {
        let Ok(wanted) = normalize_url(url) else {
            return Ok(None);
        };
        for remote in self.remotes()? {
            let matches = remote
                .urls
                .iter()
                .filter_map(|u| normalize_url(u).ok())
                .any(|u| u.same_repository(&wanted));
            if matches {
                return Ok(Some(remote));
            }
        }
        Ok(None)
    }

    /// Like [`find_remote`](Self::find_remote), creating `default_name` when
    /// no remote matches.
    pub fn find_or_create_remote(
        &self,
        url: &str,
        default_name: &str,
    ) -> Result<RemoteInfo, GitError> {
        if let Some(remote) = self.find_remote(url)? {
            return Ok(remote);
        }
        debug!(name = default_name, url, "creating remote");
        self.create_remote(default_name, url)
    }

    /// Adds a remote with the default fetch refspec.
    pub fn create_remote(&self, name: &str, url: &str) -> Result<RemoteInfo, GitError> {
        self.repo.remote(name, url)?;
        self.remote(name)
    }

    /// Finds the local branch at `sha` whose commit also exists on the remote
    /// for `repo_url`.
    ///
    /// Both a remote-tracking ref of that remote and a local branch must point
    /// at `sha`; otherwise nothing is returned.
    pub fn find_branch_by_sha(
        &self,
        sha: &str,
        repo_url: &str,
    ) -> Result<Option<Branch>, GitError> {
        let Some(remote) = self.find_remote(repo_url)? else {
            return Ok(None);
        };
        let Ok(oid) = Oid::from_str(sha) else {
            return Ok(None);
        };

        let remote_prefix = format!("refs/remotes/{}/", remote.name);
        let mut remote_ref = None;
        let mut local_ref = None;
        for reference in self.references()? {
            if reference.target != Some(oid) {
                continue;
            }
            if reference.name.starts_with(&remote_prefix) {
                remote_ref.get_or_insert(reference.name.clone());
            } else if reference.is_branch() {
                local_ref.get_or_insert(reference.short_name().to_string());
            }
        }

        match (remote_ref, local_ref) {
            (Some(_), Some(local)) => Ok(Some(self.branch_handle(&local, &remote.name)?)),
            _ => Ok(None),
        }
    }

    /// Finds the local branch `name` that also exists as `<remote>/name` on
    /// the remote for `repo_url`.
    pub fn find_branch_by_name(
        &self,
        name: &str,
        repo_url: &str,
    ) -> Result<Option<Branch>, GitError> {
        let Some(remote) = self.find_remote(repo_url)? else {
            return Ok(None);
        };

        let remote_ref = format!("refs/remotes/{}/{}", remote.name, name);
        let local_ref = format!("refs/heads/{name}");
        let refs = self.references()?;
        let has_remote = refs.iter().any(|r| r.name == remote_ref);
        let has_local = refs.iter().any(|r| r.name == local_ref);

        if has_remote && has_local {
            Ok(Some(self.branch_handle(name, &remote.name)?))
        } else {
            Ok(None)
        }
    }

    /// Finds the remote that carries branch `name`, or failing that a ref at `sha`.
    ///
    /// With exactly one remote configured it is returned without looking at refs.
    pub fn find_branch_remote(
        &self,
        name: &str,
        sha: &str,
    ) -> Result<Option<RemoteInfo>, GitError> {
        let remotes = self.remotes()?;
        if remotes.len() <= 1 {
            return Ok(remotes.into_iter().next());
        }

        let refs = self.references()?;
        let remote_branches = |remote: &RemoteInfo| {
            let prefix = format!("refs/remotes/{}/", remote.name);
            refs.iter()
                .filter_map(move |r| r.name.strip_prefix(&prefix).map(|branch| (branch.to_string(), r.target)))
                .collect::<Vec<_>>()
        };

        if !name.is_empty() {
            if let Some(remote) = remotes
                .iter()
                .find(|remote| remote_branches(remote).iter().any(|(branch, _)| branch == name))
            {
                return Ok(Some(remote.clone()));
            }
        }

        if let Ok(oid) = Oid::from_str(sha) {
            if let Some(remote) = remotes
                .iter()
                .find(|remote| remote_branches(remote).iter().any(|(_, target)| *target == Some(oid)))
            {
                return Ok(Some(remote.clone()));
            }
        }

        Ok(None)
    }

    /// Creates `local_name` tracking `<remote_name>/<remote_branch>`.
    ///
    /// The new branch points at the commit of the remote-tracking ref. The
    /// upstream is recorded in the repository config once the ref exists, and
    /// the ref is removed again if that write fails.
    ///
    /// # Errors
    ///
    /// [`GitError::BranchExists`] when the branch or its config entry already
    /// exists; nothing is changed in that case.
    pub fn create_tracking_branch(
        &self,
        local_name: &str,
        remote_branch: &str,
        remote_name: &str,
    ) -> Result<Branch, GitError> {
        let local_ref = format!("refs/heads/{local_name}");
        if self.repo.find_reference(&local_ref).is_ok() || self.branch_config(local_name)?.is_some() {
            return Err(GitError::BranchExists(local_name.to_string()));
        }

        let tracking_ref = format!("refs/remotes/{remote_name}/{remote_branch}");
        let target = self
            .repo
            .find_reference(&tracking_ref)?
            .peel_to_commit()?
            .id();

        let mut reference = self
            .repo
            .reference(&local_ref, target, false, "tea: create tracking branch")?;
        let merge = format!("refs/heads/{remote_branch}");
        if let Err(e) = self.set_branch_upstream(local_name, remote_name, &merge) {
            reference.delete()?;
            return Err(e);
        }

        Ok(Branch {
            name: local_name.to_string(),
            remote: remote_name.to_string(),
            merge,
        })
    }

    /// Reads `branch.<name>.remote` and `branch.<name>.merge`.
    pub fn branch_config(&self, name: &str) -> Result<Option<(String, String)>, GitError> {
        let config = self.repo.config()?.open_level(ConfigLevel::Local)?;
        let remote = optional(config.get_string(&format!("branch.{name}.remote")))?;
        let merge = optional(config.get_string(&format!("branch.{name}.merge")))?;
        if remote.is_none() && merge.is_none() {
            return Ok(None);
        }
        Ok(Some((remote.unwrap_or_default(), merge.unwrap_or_default())))
    }

    /// Writes the upstream of branch `name` into the repository config.
    pub fn set_branch_upstream(&self, name: &str, remote: &str, merge: &str) -> Result<(), GitError> {
        let mut config = self.repo.config()?.open_level(ConfigLevel::Local)?;
        config.set_str(&format!("branch.{name}.remote"), remote)?;
        config.set_str(&format!("branch.{name}.merge"), merge)?;
        Ok(())
    }

    /// Checks out a branch (short or full name) or any other ref into the
    /// working tree.
    ///
    /// Local changes that would be overwritten make the checkout fail.
    pub fn checkout(&self, reference: &str) -> Result<(), GitError> {
        let full = if reference.starts_with("refs/") {
            reference.to_string()
        } else {
            format!("refs/heads/{reference}")
        };
        let found = self.repo.find_reference(&full)?;
        let target = found.peel(ObjectType::Commit)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo.checkout_tree(&target, Some(&mut checkout))?;

        if found.is_branch() {
            self.repo.set_head(&full)?;
        } else {
            self.repo.set_head_detached(target.id())?;
        }
        debug!(reference = %full, "checked out");
        Ok(())
    }

    /// Deletes a local branch and its upstream configuration.
    ///
    /// A branch without config (pushed without `-u`) is fine.
    ///
    /// # Errors
    ///
    /// [`GitError::BranchCheckedOut`] when HEAD is on `branch`.
    pub fn delete_local_branch(&self, branch: &Branch) -> Result<(), GitError> {
        if self.current_branch_name().ok().as_deref() == Some(branch.name.as_str()) {
            return Err(GitError::BranchCheckedOut(branch.name.clone()));
        }

        let mut config = self.repo.config()?.open_level(ConfigLevel::Local)?;
        for key in ["remote", "merge"] {
            match config.remove(&format!("branch.{}.{key}", branch.name)) {
                Ok(()) => {}
                Err(e) if e.code() == ErrorCode::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        match self.repo.find_reference(&format!("refs/heads/{}", branch.name)) {
            Ok(mut reference) => reference.delete()?,
            Err(e) if e.code() == ErrorCode::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        debug!(branch = %branch.name, "deleted local branch");
        Ok(())
    }

    /// Deletes `branch` on `remote_name` by pushing `:refs/heads/<branch>`.
    pub fn delete_remote_branch(
        &self,
        remote_name: &str,
        branch: &str,
        auth: Option<&GitAuth>,
        insecure: bool,
    ) -> Result<(), GitError> {
        let mut remote = self.repo.find_remote(remote_name)?;
        let rejection = RefCell::new(None);

        let mut callbacks = remote_callbacks(auth, insecure);
        callbacks.push_update_reference(|refname, status| {
            if let Some(message) = status {
                *rejection.borrow_mut() = Some(format!("{refname}: {message}"));
            }
            Ok(())
        });
        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        let refspec = format!(":refs/heads/{branch}");
        remote.push(&[refspec.as_str()], Some(&mut options))?;

        if let Some(message) = rejection.take() {
            return Err(GitError::PushRejected(message));
        }
        debug!(remote = remote_name, branch, "deleted remote branch");
        Ok(())
    }

    /// Fetches `remote_name` with its configured refspecs.
    pub fn fetch(
        &self,
        remote_name: &str,
        auth: Option<&GitAuth>,
        insecure: bool,
    ) -> Result<FetchOutcome, GitError> {
        let mut remote = self.repo.find_remote(remote_name)?;
        let updated = Cell::new(0usize);

        let mut callbacks = remote_callbacks(auth, insecure);
        callbacks.update_tips(|_refname, _old, _new| {
            updated.set(updated.get() + 1);
            true
        });
        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);

        remote.fetch::<&str>(&[], Some(&mut options), None)?;

        let outcome = if updated.get() == 0 {
            FetchOutcome::UpToDate
        } else {
            FetchOutcome::Updated
        };
        debug!(remote = remote_name, ?outcome, "fetched");
        Ok(outcome)
    }

    /// Clones `url` into `path`.
    ///
    /// # Arguments
    ///
    /// * `depth` - History depth; `0` clones the full history
    /// * `insecure` - Skip TLS certificate verification
    pub fn clone(
        url: &str,
        path: &Path,
        auth: Option<&GitAuth>,
        depth: i32,
        insecure: bool,
    ) -> Result<Self, GitError> {
        let mut options = FetchOptions::new();
        options.remote_callbacks(remote_callbacks(auth, insecure));
        if depth > 0 {
            options.depth(depth);
        }

        let mut builder = RepoBuilder::new();
        builder.fetch_options(options);
        let repo = builder.clone(url, path)?;
        debug!(url, path = %path.display(), depth, "cloned");
        Ok(Self { repo })
    }

    fn branch_handle(&self, name: &str, remote: &str) -> Result<Branch, GitError> {
        let merge = match self.branch_config(name)? {
            Some((_, merge)) if !merge.is_empty() => merge,
            _ => format!("refs/heads/{name}"),
        };
        Ok(Branch {
            name: name.to_string(),
            remote: remote.to_string(),
            merge,
        })
    }
}

fn not_a_repo(err: git2::Error, path: &Path) -> GitError {
    if err.code() == ErrorCode::NotFound {
        GitError::NotARepository {
            path: path.to_path_buf(),
        }
    } else {
        GitError::Git(err)
    }
}

fn optional(value: Result<String, git2::Error>) -> Result<Option<String>, GitError> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
