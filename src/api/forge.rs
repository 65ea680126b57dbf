//
//  tea-cli
//  api/forge.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! The forge operations the CLI depends on.
//!
//! Tasks talk to the forge only through [`ForgeApi`], so tests can hand them
//! an in-memory implementation. [`ForgeConnector`] builds clients for a base
//! URL and credential, which login creation needs twice: once with basic
//! auth to create a token, then with that token.

use async_trait::async_trait;

use super::gitea::{
    AccessToken, CreatePullRequestOption, GitReference, PublicKey, PullRequest, Repository, User,
};
use super::ApiError;
use crate::auth::AuthCredential;
use crate::config::Login;

/// Typed operations against a forge's REST API.
#[async_trait]
pub trait ForgeApi: Send + Sync {
    /// The authenticated user.
    async fn whoami(&self) -> Result<User, ApiError>;

    /// All access tokens of `user`.
    async fn list_access_tokens(&self, user: &str) -> Result<Vec<AccessToken>, ApiError>;

    /// Creates an access token; the returned `sha1` holds the secret.
    async fn create_access_token(
        &self,
        user: &str,
        name: &str,
        scopes: &[&str],
    ) -> Result<AccessToken, ApiError>;

    /// SSH public keys registered for the authenticated user.
    async fn list_public_keys(&self) -> Result<Vec<PublicKey>, ApiError>;

    async fn get_repo(&self, owner: &str, name: &str) -> Result<Repository, ApiError>;

    async fn get_pull_request(
        &self,
        owner: &str,
        name: &str,
        index: i64,
    ) -> Result<PullRequest, ApiError>;

    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        option: &CreatePullRequestOption,
    ) -> Result<PullRequest, ApiError>;

    /// References matching `git_ref`; empty when nothing matches.
    async fn list_repo_refs(
        &self,
        owner: &str,
        name: &str,
        git_ref: &str,
    ) -> Result<Vec<GitReference>, ApiError>;
}

/// Builds [`ForgeApi`] clients.
pub trait ForgeConnector: Send + Sync {
    fn connect(
        &self,
        base_url: &str,
        credential: AuthCredential,
        insecure: bool,
    ) -> Result<Box<dyn ForgeApi>, ApiError>;

    /// A token authenticated client for `login`.
    fn connect_login(&self, login: &Login) -> Result<Box<dyn ForgeApi>, ApiError> {
        self.connect(
            &login.url,
            AuthCredential::Token {
                token: login.token.clone(),
            },
            login.insecure,
        )
    }
}
