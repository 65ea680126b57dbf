//
//  tea-cli
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Credentials for the two channels the CLI talks to a forge through:
//!
//! - **Forge API**: [`AuthCredential`] applied to every HTTP request, either
//!   the login's API token or, while bootstrapping a login, user name and
//!   password.
//! - **Git transport**: [`GitAuth`] handed to libgit2 for clone, fetch and
//!   push, chosen by [`resolve_git_auth`] from the remote URL's scheme.
//!
//! ## Module Structure
//!
//! - [`git`]: transport strategy selection and `git2` callbacks
//! - [`ssh`]: SSH agent detection, private key unlocking, key fingerprints
//!
//! ## Example
//!
//! ```rust
//! use tea_cli::auth::AuthCredential;
//!
//! let credential = AuthCredential::Token { token: "0123abcd".to_string() };
//! assert!(credential.is_token());
//! ```

mod git;
mod ssh;

pub use git::*;
pub use ssh::*;

use std::path::PathBuf;

use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;
use thiserror::Error;

/// Asks the user for a secret; receives the prompt text.
pub type PasswordPrompt<'a> = &'a dyn Fn(&str) -> anyhow::Result<String>;

/// Errors raised while choosing or preparing credentials.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No correct passphrase was entered for an encrypted key.
    #[error("could not unlock ssh key {path}: wrong passphrase")]
    BadPassphrase { path: PathBuf },

    /// The remote URL uses a transport that has no authentication strategy.
    #[error("unsupported remote URL scheme '{0}', expected http, https or ssh")]
    UnsupportedScheme(String),

    /// The private key file could not be read.
    #[error("could not read ssh key {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The private key file is not a key this CLI understands.
    #[error("could not parse ssh key {path}: {source}")]
    KeyParse {
        path: PathBuf,
        #[source]
        source: ssh_key::Error,
    },

    /// A public key line could not be decoded.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Reading a passphrase from the terminal failed.
    #[error("passphrase prompt failed: {0}")]
    Prompt(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Credential applied to forge API requests.
#[derive(Debug, Clone)]
pub enum AuthCredential {
    /// API token, sent as `Authorization: token <token>`.
    Token { token: String },

    /// User name and password, only used to create the first API token.
    Basic { username: String, password: String },
}

impl AuthCredential {
    /// Applies this credential to a request.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use tea_cli::auth::AuthCredential;
    ///
    /// let client = reqwest::Client::new();
    /// let credential = AuthCredential::Token { token: "abc".into() };
    /// let request = credential.apply_to_request(client.get("https://gitea.com/api/v1/user"));
    /// ```
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Token { token } => request.header(AUTHORIZATION, format!("token {token}")),
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }

    pub fn is_token(&self) -> bool {
        matches!(self, Self::Token { .. })
    }
}
