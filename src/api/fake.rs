//
//  tea-cli
//  api/fake.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! In-memory forge used by task tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::forge::{ForgeApi, ForgeConnector};
use super::gitea::{
    AccessToken, CreatePullRequestOption, GitObject, GitReference, PublicKey, PullRequest,
    Repository, User,
};
use super::ApiError;
use crate::auth::AuthCredential;

#[derive(Default)]
struct State {
    user: User,
    tokens: Vec<AccessToken>,
    keys: Vec<PublicKey>,
    keys_forbidden: bool,
    repos: HashMap<String, Repository>,
    pulls: HashMap<String, PullRequest>,
    refs: HashMap<String, Vec<GitReference>>,
    created_pulls: Vec<(String, CreatePullRequestOption)>,
    created_tokens: Vec<String>,
}

/// A forge whose clones share one state.
#[derive(Clone, Default)]
pub(crate) struct FakeForge {
    state: Arc<Mutex<State>>,
}

impl FakeForge {
    pub fn new(user: &str) -> Self {
        let forge = Self::default();
        forge.state.lock().unwrap().user = User {
            id: 1,
            login: user.to_string(),
            ..User::default()
        };
        forge
    }

    pub fn add_repo(&self, repo: Repository) {
        let key = format!("{}/{}", repo.owner.login, repo.name);
        self.state.lock().unwrap().repos.insert(key, repo);
    }

    pub fn add_pull(&self, owner: &str, name: &str, pull: PullRequest) {
        let key = format!("{owner}/{name}#{}", pull.number);
        self.state.lock().unwrap().pulls.insert(key, pull);
    }

    pub fn add_ref(&self, owner: &str, name: &str, git_ref: &str, sha: &str) {
        let reference = GitReference {
            ref_name: format!("refs/{}", git_ref.trim_start_matches("refs/")),
            object: GitObject {
                kind: "commit".to_string(),
                sha: sha.to_string(),
                ..GitObject::default()
            },
            ..GitReference::default()
        };
        let key = format!("{owner}/{name}:{}", git_ref.trim_start_matches("refs/"));
        self.state
            .lock()
            .unwrap()
            .refs
            .entry(key)
            .or_default()
            .push(reference);
    }

    pub fn add_token(&self, name: &str) {
        self.state.lock().unwrap().tokens.push(AccessToken {
            name: name.to_string(),
            ..AccessToken::default()
        });
    }

    pub fn add_key(&self, key: &str) {
        self.state.lock().unwrap().keys.push(PublicKey {
            key: key.to_string(),
            ..PublicKey::default()
        });
    }

    pub fn forbid_keys(&self) {
        self.state.lock().unwrap().keys_forbidden = true;
    }

    /// Pull requests created so far, keyed by `owner/name`.
    pub fn created_pulls(&self) -> Vec<(String, CreatePullRequestOption)> {
        self.state.lock().unwrap().created_pulls.clone()
    }

    pub fn created_tokens(&self) -> Vec<String> {
        self.state.lock().unwrap().created_tokens.clone()
    }
}

#[async_trait]
impl ForgeApi for FakeForge {
    async fn whoami(&self) -> Result<User, ApiError> {
        Ok(self.state.lock().unwrap().user.clone())
    }

    async fn list_access_tokens(&self, _user: &str) -> Result<Vec<AccessToken>, ApiError> {
        Ok(self.state.lock().unwrap().tokens.clone())
    }

    async fn create_access_token(
        &self,
        _user: &str,
        name: &str,
        _scopes: &[&str],
    ) -> Result<AccessToken, ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.tokens.iter().any(|t| t.name == name) {
            return Err(ApiError::BadRequest {
                status: 400,
                message: format!("access token name {name} is already used"),
            });
        }
        let token = AccessToken {
            id: state.tokens.len() as i64 + 1,
            name: name.to_string(),
            sha1: format!("sha1-of-{name}"),
            ..AccessToken::default()
        };
        state.tokens.push(token.clone());
        state.created_tokens.push(name.to_string());
        Ok(token)
    }

    async fn list_public_keys(&self) -> Result<Vec<PublicKey>, ApiError> {
        let state = self.state.lock().unwrap();
        if state.keys_forbidden {
            return Err(ApiError::Forbidden("token lacks read:user".to_string()));
        }
        Ok(state.keys.clone())
    }

    async fn get_repo(&self, owner: &str, name: &str) -> Result<Repository, ApiError> {
        self.state
            .lock()
            .unwrap()
            .repos
            .get(&format!("{owner}/{name}"))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("{owner}/{name}")))
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        name: &str,
        index: i64,
    ) -> Result<PullRequest, ApiError> {
        self.state
            .lock()
            .unwrap()
            .pulls
            .get(&format!("{owner}/{name}#{index}"))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("pull {index}")))
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        option: &CreatePullRequestOption,
    ) -> Result<PullRequest, ApiError> {
        let mut state = self.state.lock().unwrap();
        state
            .created_pulls
            .push((format!("{owner}/{name}"), option.clone()));
        let number = state.created_pulls.len() as i64;
        Ok(PullRequest {
            number,
            title: option.title.clone(),
            html_url: format!("https://forge.test/{owner}/{name}/pulls/{number}"),
            ..PullRequest::default()
        })
    }

    async fn list_repo_refs(
        &self,
        owner: &str,
        name: &str,
        git_ref: &str,
    ) -> Result<Vec<GitReference>, ApiError> {
        let key = format!("{owner}/{name}:{}", git_ref.trim_start_matches("refs/"));
        Ok(self
            .state
            .lock()
            .unwrap()
            .refs
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}

/// Hands out the same [`FakeForge`] and records each credential.
#[derive(Default)]
pub(crate) struct FakeConnector {
    pub forge: FakeForge,
    connections: Mutex<Vec<(String, AuthCredential)>>,
}

impl FakeConnector {
    pub fn new(forge: FakeForge) -> Self {
        Self {
            forge,
            connections: Mutex::default(),
        }
    }

    pub fn connections(&self) -> Vec<(String, AuthCredential)> {
        self.connections.lock().unwrap().clone()
    }
}

impl ForgeConnector for FakeConnector {
    fn connect(
        &self,
        base_url: &str,
        credential: AuthCredential,
        _insecure: bool,
    ) -> Result<Box<dyn ForgeApi>, ApiError> {
        self.connections
            .lock()
            .unwrap()
            .push((base_url.to_string(), credential));
        Ok(Box::new(self.forge.clone()))
    }
}
