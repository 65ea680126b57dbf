//
//  tea-cli
//  context/resolver.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Context Resolver
//!
//! Combines the global CLI options, the configured logins and the local
//! repository into a [`ResolvedContext`].
//!
//! ## Resolution Order
//!
//! 1. `--repo` pointing at a directory selects that working copy; otherwise
//!    the current directory is searched upward for one.
//! 2. The working copy's remote is matched against every login to find the
//!    login and the `owner/name` slug.
//! 3. `--repo OWNER/NAME` (or `NAME`) overrides the discovered slug.
//! 4. `--login` overrides the discovered login; without any login the
//!    default one is used.
//!
//! ## Remote Selection
//!
//! With several remotes and no `--remote`, the remote configured for the
//! first existing branch of `main`, `master`, `trunk` wins. When none of them
//! is configured the remotes are sorted by name and the first is taken.

use std::path::PathBuf;

use tracing::debug;

use super::{normalize_url, ContextError, GitError, LocalRepo, RemoteInfo};
use crate::cli::GlobalOptions;
use crate::config::{ConfigStore, Login};
use crate::output::OutputFormat;
use crate::util::{dir_exists, expand_home};

/// Branches whose upstream decides the remote when several exist.
const MAIN_BRANCHES: [&str; 3] = ["main", "master", "trunk"];

/// Context elements a command can insist on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// A local working copy was found.
    LocalRepo,
    /// The remote repository slug is known.
    RemoteRepo,
}

/// Everything a command needs to know about its target.
#[derive(Debug)]
pub struct ResolvedContext {
    /// The login to talk to the forge with.
    pub login: Login,
    /// Repository owner, empty when unknown.
    pub owner: String,
    /// Repository name, empty when unknown.
    pub name: String,
    /// The working copy, when one was found.
    pub local: Option<LocalRepo>,
    /// Output format selected with `--output`.
    pub output: OutputFormat,
}

impl ResolvedContext {
    /// `owner/name`, or an empty string when no repository is known.
    pub fn slug(&self) -> String {
        if self.name.is_empty() {
            String::new()
        } else {
            format!("{}/{}", self.owner, self.name)
        }
    }

    /// Checks the requirements and returns the first unmet one as an error.
    pub fn check(&self, requirements: &[Requirement]) -> Result<(), ContextError> {
        for requirement in requirements {
            match requirement {
                Requirement::LocalRepo if self.local.is_none() => {
                    return Err(ContextError::LocalRepoRequired)
                }
                Requirement::RemoteRepo if self.name.is_empty() => {
                    return Err(ContextError::RemoteRepoRequired)
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Exits the process with a one-line diagnostic when a requirement is unmet.
    ///
    /// This is the only place outside `main` that terminates the process.
    pub fn ensure(&self, requirements: &[Requirement]) {
        if let Err(e) = self.check(requirements) {
            eprintln!("{e}");
            std::process::exit(crate::exit_codes::ERROR);
        }
    }

    /// The working copy, or [`ContextError::LocalRepoRequired`].
    pub fn local_repo(&self) -> Result<&LocalRepo, ContextError> {
        self.local.as_ref().ok_or(ContextError::LocalRepoRequired)
    }
}

/// Resolves a [`ResolvedContext`] from options, config and the working copy.
///
/// # Example
///
/// ```rust,no_run
/// use tea_cli::cli::GlobalOptions;
/// use tea_cli::config::ConfigStore;
/// use tea_cli::context::ContextResolver;
///
/// let store = ConfigStore::load()?;
/// let options = GlobalOptions {
///     repo: Some("gitea/tea".into()),
///     ..GlobalOptions::default()
/// };
/// let ctx = ContextResolver::new(&store).resolve(&options)?;
/// assert_eq!(ctx.slug(), "gitea/tea");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct ContextResolver<'a> {
    store: &'a ConfigStore,
    workdir: PathBuf,
}

impl<'a> ContextResolver<'a> {
    /// Creates a resolver working from the current directory.
    pub fn new(store: &'a ConfigStore) -> Self {
        Self {
            store,
            workdir: PathBuf::from("."),
        }
    }

    /// Resolves relative `--repo` paths and repository discovery from `workdir`.
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    /// Resolves the context for one invocation.
    ///
    /// # Errors
    ///
    /// - [`ContextError::UnknownLogin`] when `--login` names no login
    /// - [`ContextError::NoLoginConfigured`] when there is no login at all
    /// - [`ContextError::RemoteNotFound`] when `--remote` names no remote
    /// - [`ContextError::InvalidSlug`] for a malformed `--repo` slug
    pub fn resolve(&self, options: &GlobalOptions) -> Result<ResolvedContext, ContextError> {
        let repo_flag = options.repo.as_deref().unwrap_or_default();
        let login_flag = options.login.as_deref().unwrap_or_default();
        let remote_flag = options.remote.as_deref().unwrap_or_default();

        let repo_path = self.repo_flag_dir(repo_flag);

        let mut local = None;
        let mut discovered: Option<(Login, String)> = None;
        if repo_flag.is_empty() || repo_path.is_some() {
            let opened = match &repo_path {
                Some(path) => LocalRepo::open(path),
                None => LocalRepo::discover(&self.workdir),
            };
            match opened {
                Ok(repo) => {
                    match self.discover_from_local_repo(&repo, remote_flag) {
                        Ok(found) => discovered = Some(found),
                        Err(e @ (ContextError::NoRemote | ContextError::NoMatchingLogin)) => {
                            debug!("no context from local repo: {e}");
                        }
                        Err(e) => return Err(e),
                    }
                    local = Some(repo);
                }
                Err(GitError::NotARepository { path }) => {
                    debug!(path = %path.display(), "not inside a git repository");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let (mut login, mut slug) = match discovered {
            Some((login, slug)) => (Some(login), slug),
            None => (None, String::new()),
        };

        if !repo_flag.is_empty() && repo_path.is_none() {
            slug = repo_flag.to_string();
        }

        if !login_flag.is_empty() {
            let found = self
                .store
                .get_by_name(login_flag)
                .ok_or_else(|| ContextError::UnknownLogin(login_flag.to_string()))?;
            login = Some(found.clone());
        }

        let login = match login {
            Some(login) => login,
            None => self
                .store
                .get_default()
                .map_err(|_| ContextError::NoLoginConfigured)?
                .clone(),
        };
        debug!(login = %login.name, slug = %slug, "resolved context");

        let (owner, name) = split_slug(&slug, &login.user)?;
        Ok(ResolvedContext {
            login,
            owner,
            name,
            local,
            output: options.output,
        })
    }

    /// Finds the login and slug served by a remote of `repo`.
    ///
    /// # Errors
    ///
    /// - [`ContextError::NoRemote`] when the repository has no remotes
    /// - [`ContextError::RemoteNotFound`] when `remote_flag` names no remote
    /// - [`ContextError::NoMatchingLogin`] when no login serves the remote
    pub fn discover_from_local_repo(
        &self,
        repo: &LocalRepo,
        remote_flag: &str,
    ) -> Result<(Login, String), ContextError> {
        let remotes = repo.remotes()?;
        if remotes.is_empty() {
            return Err(ContextError::NoRemote);
        }

        let remote_name = if remote_flag.is_empty() {
            choose_remote(repo, &remotes)?
        } else {
            remote_flag.to_string()
        };

        let remote = repo.remote(&remote_name).map_err(|e| match e {
            GitError::RemoteNotFound(name) => ContextError::RemoteNotFound(name),
            other => other.into(),
        })?;
        debug!(remote = %remote.name, "using remote");

        for login in self.store.logins() {
            for raw in &remote.urls {
                if let Some(slug) = slug_for_login(raw, login) {
                    debug!(login = %login.name, url = %raw, "remote matches login");
                    return Ok((login.clone(), slug));
                }
            }
        }
        Err(ContextError::NoMatchingLogin)
    }

    fn repo_flag_dir(&self, repo_flag: &str) -> Option<PathBuf> {
        if repo_flag.is_empty() {
            return None;
        }
        let path = self.workdir.join(expand_home(repo_flag));
        dir_exists(&path).unwrap_or(false).then_some(path)
    }
}

fn choose_remote(repo: &LocalRepo, remotes: &[RemoteInfo]) -> Result<String, ContextError> {
    if let [only] = remotes {
        return Ok(only.name.clone());
    }

    for branch in MAIN_BRANCHES {
        if let Some((remote, _)) = repo.branch_config(branch)? {
            if !remote.is_empty() {
                return Ok(remote);
            }
        }
    }

    let mut names: Vec<&str> = remotes.iter().map(|r| r.name.as_str()).collect();
    names.sort_unstable();
    Ok(names[0].to_string())
}

/// The `owner/name` slug `raw` addresses on `login`'s forge, if any.
fn slug_for_login(raw: &str, login: &Login) -> Option<String> {
    let url = normalize_url(raw).ok()?;

    if url.is_http() {
        let text = url.to_string();
        let rest = text.strip_prefix(login.url.as_str())?;
        if !(rest.is_empty() || rest.starts_with('/')) {
            return None;
        }
        return url.repo_ref().map(|r| r.slug());
    }

    if url.is_ssh() {
        let ssh_host = login.ssh_host();
        let matches = url.host.eq_ignore_ascii_case(&ssh_host)
            || url.hostname().eq_ignore_ascii_case(&ssh_host);
        if matches {
            let slug = url.path.trim_start_matches('/');
            return (!slug.is_empty()).then(|| slug.to_string());
        }
    }
    None
}

/// Splits `owner/name`, defaulting the owner to `user` for a bare `name`.
fn split_slug(slug: &str, user: &str) -> Result<(String, String), ContextError> {
    if slug.is_empty() {
        return Ok((String::new(), String::new()));
    }
    let parts: Vec<&str> = slug.split('/').collect();
    match parts.as_slice() {
        [owner, name] if !owner.is_empty() && !name.is_empty() => {
            Ok((owner.to_string(), name.to_string()))
        }
        [name] => Ok((user.to_string(), name.to_string())),
        _ => Err(ContextError::InvalidSlug(slug.to_string())),
    }
}
