//
//  tea-cli
//  api/gitea/repositories.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Repository and git reference types.
//!
//! # Example
//!
//! ```rust
//! use tea_cli::api::gitea::Repository;
//!
//! let json = r#"{
//!     "name": "tea",
//!     "full_name": "alice/tea",
//!     "owner": {"login": "alice"},
//!     "fork": true,
//!     "clone_url": "https://gitea.com/alice/tea.git",
//!     "ssh_url": "git@gitea.com:alice/tea.git",
//!     "parent": {
//!         "name": "tea",
//!         "owner": {"login": "gitea"},
//!         "clone_url": "https://gitea.com/gitea/tea.git",
//!         "default_branch": "main"
//!     }
//! }"#;
//! let repo: Repository = serde_json::from_str(json).unwrap();
//! assert_eq!(repo.parent.unwrap().default_branch, "main");
//! ```

use serde::{Deserialize, Serialize};

use super::users::User;

/// A repository hosted on the forge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub owner: User,

    #[serde(default)]
    pub name: String,

    /// `owner/name`.
    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub private: bool,

    #[serde(default)]
    pub fork: bool,

    /// The repository this one was forked from.
    #[serde(default)]
    pub parent: Option<Box<Repository>>,

    #[serde(default)]
    pub empty: bool,

    #[serde(default)]
    pub html_url: String,

    #[serde(default)]
    pub clone_url: String,

    #[serde(default)]
    pub ssh_url: String,

    #[serde(default)]
    pub default_branch: String,

    /// What the authenticated user may do; absent for anonymous requests.
    #[serde(default)]
    pub permissions: Option<Permission>,
}

impl Repository {
    /// The URL to clone over, `ssh_url` when `prefer_ssh` and it is set.
    pub fn git_url(&self, prefer_ssh: bool) -> &str {
        if prefer_ssh && !self.ssh_url.is_empty() {
            &self.ssh_url
        } else {
            &self.clone_url
        }
    }

    /// Whether the authenticated user can push to this repository.
    pub fn can_push(&self) -> bool {
        self.permissions.as_ref().is_some_and(|p| p.push)
    }
}

/// Access rights of the authenticated user on a repository.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permission {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

/// A git reference as reported by `/git/refs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitReference {
    #[serde(default, rename = "ref")]
    pub ref_name: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub object: GitObject,
}

/// The object a [`GitReference`] points at.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitObject {
    #[serde(default, rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub sha: String,

    #[serde(default)]
    pub url: String,
}

/// `/git/refs/{ref}` answers with one object for an exact match and an
/// array for a prefix match.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}
