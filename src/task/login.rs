//
//  tea-cli
//  task/login.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Create a login, bootstrapping an API token from a password if needed.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::find_ssh_key;
use crate::api::gitea::TOKEN_SCOPES;
use crate::api::ForgeConnector;
use crate::auth::AuthCredential;
use crate::config::{normalize_base_url, url_hostname, ConfigStore, Login};

/// Validation errors of [`create_login`], raised before any network call.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("you have to input the Gitea URL")]
    MissingUrl,

    #[error("no token set; provide a token, or a user name and password to create one")]
    MissingCredentials,

    #[error("login name '{0}' has already been used")]
    DuplicateName(String),

    #[error("token has already been used by login '{0}'")]
    DuplicateToken(String),
}

/// Input of [`create_login`]. Empty strings mean "not given".
#[derive(Debug, Clone, Default)]
pub struct CreateLoginOptions {
    pub name: String,
    pub url: String,
    pub token: String,
    pub user: String,
    pub password: String,
    /// Private key for SSH transport; discovered from `~/.ssh` when empty.
    pub ssh_key: String,
    pub insecure: bool,
}

/// The stored login and anything worth telling the user about it.
#[derive(Debug, Clone)]
pub struct CreatedLogin {
    pub login: Login,
    /// Set when SSH key discovery failed; the login was stored anyway.
    pub warning: Option<String>,
}

/// Verifies the credentials against the forge and stores a new login.
///
/// Without a token, one is created over basic auth and named
/// `<hostname>-tea`, with a timestamp appended when that name is taken.
///
/// # Arguments
///
/// * `ssh_dir` - Where to look for a registered SSH key when none is given
pub async fn create_login(
    store: &mut ConfigStore,
    connector: &dyn ForgeConnector,
    options: CreateLoginOptions,
    ssh_dir: &Path,
) -> Result<CreatedLogin> {
    validate(store, &options)?;

    let base_url = normalize_base_url(&options.url)?;
    let hostname = url_hostname(&base_url).unwrap_or_default();
    let mut login = Login {
        name: options.name,
        url: base_url.clone(),
        token: options.token,
        ssh_key: options.ssh_key,
        insecure: options.insecure,
        ..Login::default()
    };

    if login.token.is_empty() {
        let credential = AuthCredential::Basic {
            username: options.user.clone(),
            password: options.password,
        };
        let client = connector.connect(&base_url, credential, login.insecure)?;
        let existing = client
            .list_access_tokens(&options.user)
            .await
            .context("could not list access tokens")?;

        let mut token_name = format!("{hostname}-tea");
        if existing.iter().any(|t| t.name == token_name) {
            token_name = format!("{token_name}-{}", Utc::now().timestamp());
        }
        let token = client
            .create_access_token(&options.user, &token_name, &TOKEN_SCOPES)
            .await
            .context("could not create an access token")?;
        info!(name = %token_name, "created access token");
        login.token = token.sha1;
    }

    let api = connector.connect_login(&login)?;
    let user = api
        .whoami()
        .await
        .context("could not verify the login against the forge")?;
    debug!(user = %user.login, "authenticated");
    login.user = user.login;

    if login.name.is_empty() {
        login.name = store.generate_login_name(&base_url, &login.user)?;
    }
    if login.ssh_host.is_empty() {
        login.ssh_host = hostname;
    }

    let mut warning = None;
    if login.ssh_key.is_empty() {
        match find_ssh_key(api.as_ref(), ssh_dir).await {
            Ok(Some(key)) => login.ssh_key = key.display().to_string(),
            Ok(None) => debug!("no registered ssh key found locally"),
            Err(e) => {
                warn!(error = %e, "ssh key discovery failed");
                warning = Some(format!("problem while finding ssh key: {e:#}"));
            }
        }
    }

    login.created = Utc::now().timestamp();
    store.add(login.clone())?;
    Ok(CreatedLogin { login, warning })
}

fn validate(store: &ConfigStore, options: &CreateLoginOptions) -> Result<(), LoginError> {
    if options.url.trim().is_empty() {
        return Err(LoginError::MissingUrl);
    }
    if !options.name.is_empty() && store.get_by_name(&options.name).is_some() {
        return Err(LoginError::DuplicateName(options.name.clone()));
    }
    if let Some(existing) = store.get_by_token(&options.token) {
        return Err(LoginError::DuplicateToken(existing.name.clone()));
    }
    if options.token.is_empty() && (options.user.is_empty() || options.password.is_empty()) {
        return Err(LoginError::MissingCredentials);
    }
    Ok(())
}
