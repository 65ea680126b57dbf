//
//  tea-cli
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # tea CLI Library
//!
//! A command-line interface library for Gitea and compatible forges.
//!
//! ## Overview
//!
//! This library provides the core of the `tea` CLI tool. Given command-line
//! overrides, the configured logins and the `.git` metadata of the working
//! directory, it works out which login, which forge repository and which local
//! branch an invocation refers to, then runs flows that combine forge API calls
//! with local git operations.
//!
//! ## Features
//!
//! - **Context Resolution**: Login and repository picked from git remotes
//! - **Pull Request Workflows**: Check out, clean up and create pull requests
//! - **Fork-Aware Cloning**: Clones of forks get their parent as `upstream`
//! - **Token Bootstrap**: Logins created from a password get their own API token
//! - **SSH Support**: Agent first, then on-disk keys with passphrase prompts
//!
//! ## Module Structure
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`api`]: Forge REST API client and models
//! - [`auth`]: Credentials for git transport and the API
//! - [`config`]: Login configuration file
//! - [`context`]: URL normalization, local repositories and context resolution
//! - [`task`]: Multi-step forge flows
//! - [`output`]: Output formatting (Table, JSON, YAML)
//! - [`interactive`]: Interactive prompts
//! - [`util`]: Utility functions
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use tea_cli::cli::GlobalOptions;
//! use tea_cli::config::ConfigStore;
//! use tea_cli::context::ContextResolver;
//!
//! let store = ConfigStore::load()?;
//! let ctx = ContextResolver::new(&store).resolve(&GlobalOptions::default())?;
//! println!("{} on {}", ctx.slug(), ctx.login.url);
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Command-line interface definitions.
///
/// Each command module parses its arguments and hands off to a [`task`].
pub mod cli;

/// Forge API client implementations.
///
/// [`api::ForgeApi`] is the seam the tasks depend on; [`api::GiteaClient`]
/// implements it over HTTP against `/api/v1`.
pub mod api;

/// Authentication for git transport and the forge API.
///
/// Handles:
/// - Token over HTTP basic auth
/// - SSH agent and on-disk private keys
/// - Passphrase prompting with a bounded number of attempts
pub mod auth;

/// Configuration file management.
///
/// Logins are stored in platform-specific locations:
/// - Linux: `~/.config/tea/config.yml`
/// - macOS: `~/Library/Application Support/tea/config.yml`
/// - Windows: `%APPDATA%\tea\config\config.yml`
pub mod config;

/// Working copy and context detection.
pub mod context;

/// Forge flows that combine API calls with local git operations.
pub mod task;

/// Output formatting for different modes.
pub mod output;

/// Interactive terminal prompts.
pub mod interactive;

/// Utility functions.
pub mod util;

pub use cli::Cli;

pub use config::ConfigStore;

pub use context::ResolvedContext;

/// The name of the CLI binary.
pub const APP_NAME: &str = "tea";

/// The current version of the tea CLI, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process exit codes.
///
/// # Example
///
/// ```rust,no_run
/// use std::process;
/// use tea_cli::exit_codes;
///
/// process::exit(exit_codes::ERROR);
/// ```
pub mod exit_codes {
    /// The command completed successfully.
    pub const SUCCESS: i32 = 0;

    /// Any failure, including missing context.
    pub const ERROR: i32 = 1;
}
