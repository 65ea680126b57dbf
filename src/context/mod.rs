//
//  tea-cli
//  context/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Repository Context Module
//!
//! This module works out which login, which remote repository and which local
//! working copy a command invocation refers to.
//!
//! ## Overview
//!
//! The context module is responsible for:
//! - Normalizing git remote URLs of every shape (scp-like, ssh, http, bare paths)
//! - Wrapping the local git repository behind a small facade
//! - Matching remotes of the working copy against configured logins
//! - Merging `--login`, `--repo` and `--remote` with what was discovered
//!
//! ## Architecture
//!
//! - [`normalize_url`] / [`NormalizedUrl`]: URL parsing
//! - [`LocalRepo`]: git operations on the working copy
//! - [`ContextResolver`]: resolution logic
//! - [`ResolvedContext`]: the result, with the [`ensure`](ResolvedContext::ensure) gate
//!
//! ## Example
//!
//! ```rust,no_run
//! use tea_cli::cli::GlobalOptions;
//! use tea_cli::config::ConfigStore;
//! use tea_cli::context::{ContextResolver, Requirement};
//!
//! let store = ConfigStore::load()?;
//! let ctx = ContextResolver::new(&store).resolve(&GlobalOptions::default())?;
//! ctx.ensure(&[Requirement::RemoteRepo]);
//! println!("{} on {}", ctx.slug(), ctx.login.url);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub(crate) mod git;
mod resolver;
mod url;

pub use git::*;
pub use resolver::*;
pub use url::*;

use thiserror::Error;

/// Errors raised while resolving the context of an invocation.
#[derive(Error, Debug)]
pub enum ContextError {
    /// The local repository has no remotes.
    #[error("the local repository has no remotes")]
    NoRemote,

    /// The remote named with `--remote` is not configured.
    #[error("remote '{0}' not found in the local repository")]
    RemoteNotFound(String),

    /// No configured login serves any URL of the chosen remote.
    #[error("no login matches the remotes of the local repository")]
    NoMatchingLogin,

    /// `--login` names a login that does not exist.
    #[error("login '{0}' not found; see `tea login list`")]
    UnknownLogin(String),

    /// There is no login at all.
    #[error("no logins configured; run `tea login add` first")]
    NoLoginConfigured,

    /// The repository slug is not `owner/name` or `name`.
    #[error("invalid repository '{0}', expected OWNER/NAME")]
    InvalidSlug(String),

    #[error("Local repository required: Execute from a repo dir, or specify a path with --repo.")]
    LocalRepoRequired,

    #[error("Remote repository required: Specify ID via --repo or execute from a local git repo.")]
    RemoteRepoRequired,

    #[error(transparent)]
    Git(#[from] GitError),
}
