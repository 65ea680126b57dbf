//
//  tea-cli
//  context/url.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Git URL Normalization
//!
//! This module turns the many spellings of a git remote URL into one
//! structured form, [`NormalizedUrl`], so that remotes, logins and forge
//! metadata can be compared with each other.
//!
//! ## Supported Inputs
//!
//! | Input | Scheme | Host | Path |
//! |-------|--------|------|------|
//! | `ssh://git@host:3000/a/b` | `ssh` | `host:3000` | `/a/b` |
//! | `git@host:a/b.git` | `ssh` | `host` | `/a/b` |
//! | `git+ssh://git@host/a/b` | `ssh` | `host` | `/a/b` |
//! | `https://host/a/b.git` | `https` | `host` | `/a/b` |
//! | `host/a/b` | `https` | `host` | `/a/b` |
//! | `foo/bar` | (empty) | (empty) | `foo/bar` |
//! | `C:\repos\tea` | (empty) | (empty) | `C:\repos\tea` |
//!
//! ## Example
//!
//! ```rust
//! use tea_cli::context::normalize_url;
//!
//! let url = normalize_url("git@gitea.com:gitea/tea.git").unwrap();
//! assert_eq!(url.scheme, "ssh");
//! assert_eq!(url.host, "gitea.com");
//! assert_eq!(url.path, "/gitea/tea");
//! ```
//!
//! ## Notes
//!
//! - A bare word such as `host.example` is kept as a relative path with an
//!   empty scheme and empty host. Callers decide what it means.
//! - The host keeps its port (`host:3000`); use [`NormalizedUrl::hostname`]
//!   for the bare name.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

/// Matches inputs that already carry a `scheme://` prefix.
static PROTOCOL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_+-]+://").expect("protocol pattern is valid"));

/// Errors produced while normalizing a URL.
#[derive(Error, Debug)]
pub enum UrlError {
    /// The URL parser rejected the (possibly rewritten) input.
    #[error("malformed URL '{url}': {source}")]
    Malformed {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// A git remote URL reduced to the parts the CLI compares on.
///
/// # Fields
///
/// * `scheme` - `ssh`, `http`, `https`, or empty for relative paths
/// * `host` - Host name including any explicit port
/// * `port` - The explicit port, if one was given
/// * `user` - The user part of the authority (`git` for most SSH remotes)
/// * `path` - Repository path, without a trailing `.git`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedUrl {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub path: String,
}

impl NormalizedUrl {
    fn relative(path: &str) -> Self {
        Self {
            path: clean_path(path),
            ..Self::default()
        }
    }

    /// Returns the host without its port.
    pub fn hostname(&self) -> &str {
        match self.host.rsplit_once(':') {
            Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
                name
            }
            _ => &self.host,
        }
    }

    /// Whether this URL uses plain or TLS HTTP.
    pub fn is_http(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("http") || self.scheme.eq_ignore_ascii_case("https")
    }

    /// Whether this URL uses the SSH transport.
    pub fn is_ssh(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("ssh")
    }

    /// Two URLs address the same repository when host and path agree.
    ///
    /// Scheme and user are ignored so that an SSH remote and an HTTPS remote
    /// of the same repository compare equal.
    pub fn same_repository(&self, other: &NormalizedUrl) -> bool {
        self.hostname().eq_ignore_ascii_case(other.hostname()) && self.path == other.path
    }

    /// Returns the `owner/name` pair addressed by this URL's path.
    pub fn repo_ref(&self) -> Option<RepoRef> {
        RepoRef::from_path(&self.path)
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scheme.is_empty() {
            return f.write_str(&self.path);
        }
        write!(f, "{}://", self.scheme)?;
        if !self.user.is_empty() {
            write!(f, "{}@", self.user)?;
        }
        write!(f, "{}{}", self.host, self.path)
    }
}

/// Parses a raw git URL into a [`NormalizedUrl`].
///
/// # Arguments
///
/// * `raw` - Any remote spelling accepted by git, or an `owner/repo` style path
///
/// # Returns
///
/// The normalized URL, or [`UrlError::Malformed`] when the input cannot be
/// parsed even after rewriting.
///
/// # Example
///
/// ```rust
/// use tea_cli::context::normalize_url;
///
/// let url = normalize_url("ssh://git@host:3000/a/b").unwrap();
/// assert_eq!(url.host, "host:3000");
/// assert_eq!(url.port, Some(3000));
///
/// let bare = normalize_url("host").unwrap();
/// assert_eq!(bare.scheme, "");
/// assert_eq!(bare.path, "host");
/// ```
pub fn normalize_url(raw: &str) -> Result<NormalizedUrl, UrlError> {
    let candidate = if PROTOCOL_PATTERN.is_match(raw) {
        raw.to_string()
    } else if raw.contains(':') && !raw.contains('\\') {
        // scp-like `user@host:owner/repo`
        format!("ssh://{}", raw.replacen(':', "/", 1))
    } else if looks_like_host_path(raw) {
        format!("https://{raw}")
    } else {
        return Ok(NormalizedUrl::relative(raw));
    };

    let parsed = Url::parse(&candidate).map_err(|source| UrlError::Malformed {
        url: raw.to_string(),
        source,
    })?;

    let scheme = match parsed.scheme() {
        "git+ssh" | "ssh+git" => "ssh".to_string(),
        other => other.to_string(),
    };
    let host = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    Ok(NormalizedUrl {
        scheme,
        host,
        port: parsed.port(),
        user: parsed.username().to_string(),
        path: clean_path(parsed.path()),
    })
}

/// `host/owner/repo` without a scheme. Two segments (`owner/repo`) stay relative.
fn looks_like_host_path(raw: &str) -> bool {
    if raw.starts_with(['/', '.', '~']) {
        return false;
    }
    let segments: Vec<&str> = raw.split('/').collect();
    segments.len() >= 3 && segments.iter().take(3).all(|s| !s.is_empty())
}

fn clean_path(path: &str) -> String {
    let path = path
        .strip_prefix('/')
        .filter(|rest| rest.starts_with('/'))
        .unwrap_or(path);
    path.strip_suffix(".git").unwrap_or(path).to_string()
}

/// An `owner/name` pair identifying a repository on a forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Takes the last two segments of a URL path, dropping any `.git` suffix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tea_cli::context::RepoRef;
    ///
    /// let r = RepoRef::from_path("/sub/dir/gitea/tea.git").unwrap();
    /// assert_eq!(r.slug(), "gitea/tea");
    /// ```
    pub fn from_path(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [.., owner, name] => {
                let name = name.strip_suffix(".git").unwrap_or(name);
                Some(Self::new(*owner, name))
            }
            _ => None,
        }
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
