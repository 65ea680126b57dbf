//
//  tea-cli
//  auth/git.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Git Transport Authentication
//!
//! Chooses how git talks to a remote for a given login and turns that choice
//! into `git2` callbacks.
//!
//! ## Strategy
//!
//! | Remote scheme | Strategy |
//! |---------------|----------|
//! | `http`, `https` | Basic auth with the login token as user name and an empty password |
//! | `ssh` | SSH agent when one is reachable, else the configured private key |
//! | anything else | [`AuthError::UnsupportedScheme`] |
//!
//! ## Example
//!
//! ```rust,no_run
//! use tea_cli::auth::{remote_callbacks, resolve_git_auth};
//! use tea_cli::config::Login;
//! use tea_cli::context::normalize_url;
//!
//! let login = Login { token: "secret".into(), ..Login::default() };
//! let url = normalize_url("https://gitea.com/gitea/tea.git")?;
//! let auth = resolve_git_auth(&url, &login, None)?;
//! let callbacks = remote_callbacks(Some(&auth), login.insecure);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fmt;
use std::path::PathBuf;

use git2::{CertificateCheckStatus, Cred, CredentialType, RemoteCallbacks};
use tracing::debug;

use super::ssh::{ssh_agent_available, unlock_private_key, DEFAULT_PRIVATE_KEY};
use super::{AuthError, PasswordPrompt};
use crate::config::Login;
use crate::context::NormalizedUrl;
use crate::util::expand_home;

/// Credentials handed to git for one remote operation.
#[derive(Clone, PartialEq, Eq)]
pub enum GitAuth {
    /// HTTP basic auth with the API token as user name.
    Token { token: String },
    /// Keys held by the running SSH agent.
    SshAgent { user: String },
    /// A private key file, with the passphrase that unlocks it.
    SshKey {
        user: String,
        private_key: PathBuf,
        passphrase: Option<String>,
    },
}

impl fmt::Debug for GitAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token { .. } => f.write_str("Token(..)"),
            Self::SshAgent { user } => f.debug_struct("SshAgent").field("user", user).finish(),
            Self::SshKey {
                user, private_key, ..
            } => f
                .debug_struct("SshKey")
                .field("user", user)
                .field("private_key", private_key)
                .finish_non_exhaustive(),
        }
    }
}

impl GitAuth {
    /// Builds the `git2` credential for this strategy.
    pub fn credential(&self, username_from_url: Option<&str>) -> Result<Cred, git2::Error> {
        match self {
            Self::Token { token } => Cred::userpass_plaintext(token, ""),
            Self::SshAgent { user } => Cred::ssh_key_from_agent(username_from_url.unwrap_or(user)),
            Self::SshKey {
                user,
                private_key,
                passphrase,
            } => Cred::ssh_key(
                username_from_url.unwrap_or(user),
                None,
                private_key,
                passphrase.as_deref(),
            ),
        }
    }

    fn user(&self) -> &str {
        match self {
            Self::Token { token } => token,
            Self::SshAgent { user } | Self::SshKey { user, .. } => user,
        }
    }
}

/// Picks the transport authentication for `url` using `login`'s credentials.
///
/// # Arguments
///
/// * `url` - The normalized remote URL
/// * `login` - Supplies the token, the private key path and nothing else
/// * `prompt` - Used to ask for a key passphrase when the key is encrypted
///
/// # Errors
///
/// - [`AuthError::UnsupportedScheme`] for anything but http(s) and ssh
/// - Key errors from [`unlock_private_key`] when falling back to a key file
pub fn resolve_git_auth(
    url: &NormalizedUrl,
    login: &Login,
    prompt: Option<PasswordPrompt<'_>>,
) -> Result<GitAuth, AuthError> {
    if url.is_http() {
        return Ok(GitAuth::Token {
            token: login.token.clone(),
        });
    }
    if !url.is_ssh() {
        return Err(AuthError::UnsupportedScheme(url.scheme.clone()));
    }

    let user = if url.user.is_empty() {
        "git".to_string()
    } else {
        url.user.clone()
    };

    if ssh_agent_available() {
        debug!(%user, "using ssh agent");
        return Ok(GitAuth::SshAgent { user });
    }
    ssh_key_auth(user, login, prompt)
}

fn ssh_key_auth(
    user: String,
    login: &Login,
    prompt: Option<PasswordPrompt<'_>>,
) -> Result<GitAuth, AuthError> {
    let configured = if login.ssh_key.is_empty() {
        DEFAULT_PRIVATE_KEY
    } else {
        login.ssh_key.as_str()
    };
    let private_key = expand_home(configured);
    debug!(key = %private_key.display(), "using ssh key file");

    let passphrase = unlock_private_key(&private_key, prompt)?;
    Ok(GitAuth::SshKey {
        user,
        private_key,
        passphrase,
    })
}

/// Builds remote callbacks that offer `auth` once and optionally skip TLS checks.
///
/// libgit2 asks again after a rejected credential; the second request fails
/// instead of looping on the same credential.
pub fn remote_callbacks(auth: Option<&GitAuth>, insecure: bool) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();

    if let Some(auth) = auth {
        let mut offered = false;
        callbacks.credentials(move |_url, username_from_url, allowed| {
            if allowed.contains(CredentialType::USERNAME) {
                return Cred::username(username_from_url.unwrap_or(auth.user()));
            }
            if offered {
                return Err(git2::Error::from_str(
                    "authentication failed: the remote rejected the credentials",
                ));
            }
            offered = true;
            auth.credential(username_from_url)
        });
    }

    if insecure {
        callbacks.certificate_check(|_cert, _host| Ok(CertificateCheckStatus::CertificateOk));
    }
    callbacks
}
