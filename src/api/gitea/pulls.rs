//
//  tea-cli
//  api/gitea/pulls.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pull request types.
//!
//! # Pull Request Heads
//!
//! `head.ref` is the branch name while the head branch exists. Once the head
//! branch is deleted the server reports `refs/pull/<index>/head` instead and
//! only `head.label` keeps the original branch name. When the head
//! repository itself is deleted `head.repo` is null.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::repositories::Repository;
use super::users::User;

/// Open or closed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    #[default]
    Open,
    Closed,
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Closed => "closed",
        })
    }
}

/// A pull request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    #[serde(default)]
    pub id: i64,

    /// Index of the pull request within its repository.
    #[serde(default)]
    pub number: i64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub body: String,

    #[serde(default)]
    pub state: StateType,

    #[serde(default)]
    pub merged: bool,

    #[serde(default)]
    pub user: Option<User>,

    #[serde(default)]
    pub html_url: String,

    #[serde(default)]
    pub head: PrBranchInfo,

    #[serde(default)]
    pub base: PrBranchInfo,
}

/// One side (head or base) of a pull request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrBranchInfo {
    /// Branch name as originally pushed.
    #[serde(default, rename = "label")]
    pub name: String,

    #[serde(default, rename = "ref")]
    pub ref_name: String,

    /// Commit the branch points at; some server versions leave this empty
    /// once the branch is deleted.
    #[serde(default)]
    pub sha: String,

    #[serde(default)]
    pub repo_id: i64,

    #[serde(default)]
    pub repo: Option<Repository>,
}

impl PrBranchInfo {
    /// Whether `ref` shows the pull request ref of a deleted head branch.
    pub fn branch_deleted(&self, index: i64) -> bool {
        self.ref_name == format!("refs/pull/{index}/head")
    }
}

/// Body of `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CreatePullRequestOption {
    /// `branch` or `owner:branch` for a branch of a fork.
    pub head: String,
    pub base: String,
    pub title: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,

    /// Label IDs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<i64>,

    /// Milestone ID, `0` for none.
    #[serde(skip_serializing_if = "is_zero")]
    pub milestone: i64,

    #[serde(skip_serializing_if = "Option::is_none", rename = "due_date")]
    pub deadline: Option<DateTime<Utc>>,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}
