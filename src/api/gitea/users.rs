//
//  tea-cli
//  api/gitea/users.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! User, access token and public key types.

use serde::{Deserialize, Serialize};

/// Scopes requested for the token created while adding a login.
pub const TOKEN_SCOPES: [&str; 7] = [
    "write:repository",
    "write:issue",
    "write:user",
    "write:organization",
    "write:notification",
    "write:misc",
    "write:package",
];

/// A forge account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(default)]
    pub id: i64,

    /// Login name, used as the owner of personal repositories.
    #[serde(default)]
    pub login: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub is_admin: bool,
}

/// An API access token.
///
/// `sha1` holds the secret and is only filled in the response that created
/// the token; listings return `token_last_eight` instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessToken {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub sha1: String,

    #[serde(default)]
    pub token_last_eight: String,

    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Body of `POST /users/{user}/tokens`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAccessTokenOption {
    pub name: String,
    pub scopes: Vec<String>,
}

/// An SSH public key registered for the authenticated user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicKey {
    #[serde(default)]
    pub id: i64,

    /// The key line, `<type> <base64> [comment]`.
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub title: String,

    /// `SHA256:` fingerprint as computed by the server.
    #[serde(default)]
    pub fingerprint: String,
}
