//
//  tea-cli
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! This module manages the named forge logins of the tea CLI. Logins are
//! stored in a YAML document and accessed through a [`ConfigStore`].
//!
//! ## Configuration File Location
//!
//! - Linux: `~/.config/tea/config.yml`
//! - macOS: `~/Library/Application Support/tea/config.yml`
//! - Windows: `%APPDATA%\tea\config\config.yml`
//!
//! When the preferred file is missing, the legacy `~/.tea/tea.yml` is read
//! instead. Saves always go to the preferred location.
//!
//! ## Configuration Format
//!
//! ```yaml
//! logins:
//!   - name: gitea.com
//!     url: https://gitea.com
//!     token: 0123456789abcdef
//!     default: true
//!     ssh_host: gitea.com
//!     ssh_key: /home/alice/.ssh/id_ed25519
//!     insecure: false
//!     user: alice
//!     created: 1704067200
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use tea_cli::config::ConfigStore;
//!
//! let store = ConfigStore::load()?;
//! let login = store.get_default()?;
//! println!("Default login: {} ({})", login.name, login.url);
//! # Ok::<(), tea_cli::config::ConfigError>(())
//! ```
//!
//! ## Notes
//!
//! - The store is loaded once per process by the command layer and handed down.
//! - Concurrent tea processes adding logins may lose one of the writes; the
//!   file is not locked.

mod file;
mod hosts;

pub use file::*;
pub use hosts::*;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised by the configuration layer.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the configuration file failed.
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the login schema.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),

    /// No per-user configuration directory exists on this platform.
    #[error("could not determine the user configuration directory")]
    NoConfigDir,

    /// The store has no logins at all.
    #[error("no logins configured; run `tea login add` first")]
    NoLoginAvailable,

    /// A login with this name is already stored.
    #[error("login name '{0}' is already in use")]
    DuplicateName(String),

    /// A login with this token is already stored (under the given name).
    #[error("token is already used by login '{0}'")]
    DuplicateToken(String),

    /// No login with this name exists.
    #[error("login '{0}' not found")]
    NotFound(String),

    /// A forge base URL could not be normalized.
    #[error("invalid forge URL {0}")]
    InvalidUrl(String),
}

/// A named forge endpoint plus the credentials used against it.
///
/// # Fields
///
/// * `name` - Unique name of the login
/// * `url` - Normalized base URL of the forge (no trailing slash)
/// * `token` - API token
/// * `default` - Whether this is the default login
/// * `ssh_host` - Host name used to match SSH remotes, empty for the URL's host
/// * `ssh_key` - Path of the private key for SSH transport, empty for `~/.ssh/id_rsa`
/// * `insecure` - Skip TLS certificate verification
/// * `user` - Forge user name, filled in by a successful `whoami`
/// * `created` - Unix timestamp of creation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Login {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub ssh_host: String,
    #[serde(default)]
    pub ssh_key: String,
    #[serde(default)]
    pub insecure: bool,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub created: i64,
}

impl Login {
    /// Host name of the base URL.
    pub fn hostname(&self) -> String {
        url_hostname(&self.url).unwrap_or_default()
    }

    /// Host used to recognize SSH remotes of this forge.
    pub fn ssh_host(&self) -> String {
        if self.ssh_host.is_empty() {
            self.hostname()
        } else {
            self.ssh_host.clone()
        }
    }

    /// Whether an SSH private key is configured for this login.
    pub fn has_ssh_key(&self) -> bool {
        !self.ssh_key.is_empty()
    }
}

/// The on-disk configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Logins in the order they were added.
    #[serde(default)]
    pub logins: Vec<Login>,
}

/// Owns the loaded [`Config`] and persists every mutation.
///
/// # Example
///
/// ```rust,no_run
/// use tea_cli::config::{ConfigStore, Login};
///
/// let mut store = ConfigStore::load()?;
/// store.add(Login {
///     name: "work".into(),
///     url: "https://git.example.com".into(),
///     token: "secret".into(),
///     ..Login::default()
/// })?;
/// store.set_default("work")?;
/// # Ok::<(), tea_cli::config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    /// Loads the configuration from the platform locations.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(config_path()?, legacy_config_path())
    }

    /// Loads the configuration from `path`, falling back to `legacy` for reading.
    ///
    /// Neither file existing yields an empty configuration bound to `path`.
    pub fn load_from(path: PathBuf, legacy: Option<PathBuf>) -> Result<Self, ConfigError> {
        let source = if path.exists() {
            Some(path.clone())
        } else {
            legacy.filter(|p| p.exists())
        };

        let config = match source {
            Some(source) => {
                debug!(path = %source.display(), "loading config");
                let content = read_config_file(&source)?;
                if content.trim().is_empty() {
                    Config::default()
                } else {
                    serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                        path: source.clone(),
                        source: e,
                    })?
                }
            }
            None => Config::default(),
        };

        Ok(Self { path, config })
    }

    /// Creates a store around an in-memory configuration.
    pub fn new(path: PathBuf, config: Config) -> Self {
        Self { path, config }
    }

    /// Path the store saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn logins(&self) -> &[Login] {
        &self.config.logins
    }

    /// Returns the login flagged as default, else the first login.
    pub fn get_default(&self) -> Result<&Login, ConfigError> {
        self.config
            .logins
            .iter()
            .find(|l| l.default)
            .or_else(|| self.config.logins.first())
            .ok_or(ConfigError::NoLoginAvailable)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Login> {
        self.config.logins.iter().find(|l| l.name == name)
    }

    pub fn get_by_token(&self, token: &str) -> Option<&Login> {
        if token.is_empty() {
            return None;
        }
        self.config.logins.iter().find(|l| l.token == token)
    }

    /// Appends a login and saves.
    ///
    /// The first login added to an empty store becomes the default. A login
    /// added with `default` set takes the flag away from every other login.
    pub fn add(&mut self, mut login: Login) -> Result<(), ConfigError> {
        if self.get_by_name(&login.name).is_some() {
            return Err(ConfigError::DuplicateName(login.name));
        }
        if let Some(existing) = self.get_by_token(&login.token) {
            return Err(ConfigError::DuplicateToken(existing.name.clone()));
        }

        if self.config.logins.is_empty() {
            login.default = true;
        } else if login.default {
            self.config.logins.iter_mut().for_each(|l| l.default = false);
        }
        self.config.logins.push(login);
        self.save()
    }

    /// Removes the named login and saves.
    pub fn delete(&mut self, name: &str) -> Result<Login, ConfigError> {
        let index = self
            .config
            .logins
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| ConfigError::NotFound(name.to_string()))?;
        let removed = self.config.logins.remove(index);
        self.save()?;
        Ok(removed)
    }

    /// Makes `name` the only default login and saves.
    pub fn set_default(&mut self, name: &str) -> Result<(), ConfigError> {
        if self.get_by_name(name).is_none() {
            return Err(ConfigError::NotFound(name.to_string()));
        }
        for login in &mut self.config.logins {
            login.default = login.name == name;
        }
        self.save()
    }

    /// Atomically writes the configuration to [`path`](Self::path).
    pub fn save(&self) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(&self.config).map_err(ConfigError::Serialize)?;
        write_config_file(&self.path, &content)?;
        debug!(path = %self.path.display(), "saved config");
        Ok(())
    }

    /// Proposes a login name for a new login on `base_url`.
    ///
    /// The name is the URL's host; when that name is taken and `user` is known,
    /// `host_user` is proposed instead.
    pub fn generate_login_name(&self, base_url: &str, user: &str) -> Result<String, ConfigError> {
        let host = url_host(base_url).ok_or_else(|| ConfigError::InvalidUrl(base_url.to_string()))?;
        if !user.is_empty() && self.get_by_name(&host).is_some() {
            return Ok(format!("{host}_{user}"));
        }
        Ok(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn login(name: &str, token: &str) -> Login {
        Login {
            name: name.to_string(),
            url: "https://gitea.com".to_string(),
            token: token.to_string(),
            ..Login::default()
        }
    }

    fn empty_store(temp: &TempDir) -> ConfigStore {
        ConfigStore::load_from(temp.path().join("tea").join("config.yml"), None).unwrap()
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = empty_store(&temp);
        assert!(store.logins().is_empty());
        assert!(matches!(store.get_default(), Err(ConfigError::NoLoginAvailable)));
    }

    #[test]
    fn test_load_falls_back_to_legacy() {
        let temp = TempDir::new().unwrap();
        let legacy = temp.path().join(".tea").join("tea.yml");
        std::fs::create_dir_all(legacy.parent().unwrap()).unwrap();
        std::fs::write(
            &legacy,
            "logins:\n- name: old\n  url: https://old.example.com\n  token: t\n",
        )
        .unwrap();

        let path = temp.path().join("tea").join("config.yml");
        let store = ConfigStore::load_from(path.clone(), Some(legacy)).unwrap();
        assert_eq!(store.logins().len(), 1);
        assert_eq!(store.logins()[0].name, "old");
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_preferred_path_wins_over_legacy() {
        let temp = TempDir::new().unwrap();
        let legacy = temp.path().join("tea.yml");
        std::fs::write(&legacy, "logins:\n- name: old\n").unwrap();
        let path = temp.path().join("config.yml");
        std::fs::write(&path, "logins:\n- name: new\n").unwrap();

        let store = ConfigStore::load_from(path, Some(legacy)).unwrap();
        assert_eq!(store.logins()[0].name, "new");
    }

    #[test]
    fn test_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        std::fs::write(&path, "logins: [unterminated").unwrap();
        assert!(matches!(
            ConfigStore::load_from(path, None),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_add_persists_and_round_trips() {
        let temp = TempDir::new().unwrap();
        let mut store = empty_store(&temp);
        store.add(login("a", "t1")).unwrap();
        store.add(login("b", "t2")).unwrap();

        let reloaded = ConfigStore::load_from(store.path().to_path_buf(), None).unwrap();
        assert_eq!(reloaded.config(), store.config());
        assert_eq!(reloaded.get_by_name("b").unwrap().token, "t2");
        assert_eq!(reloaded.get_by_token("t1").unwrap().name, "a");
        assert!(reloaded.get_by_token("").is_none());
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let temp = TempDir::new().unwrap();
        let mut store = empty_store(&temp);
        store.add(login("a", "t1")).unwrap();

        assert!(matches!(
            store.add(login("a", "t2")),
            Err(ConfigError::DuplicateName(name)) if name == "a"
        ));
        assert!(matches!(
            store.add(login("b", "t1")),
            Err(ConfigError::DuplicateToken(name)) if name == "a"
        ));

        assert_eq!(store.logins().len(), 1);
    }

    #[test]
    fn test_default_is_unique() {
        let temp = TempDir::new().unwrap();
        let mut store = empty_store(&temp);
        store.add(login("a", "t1")).unwrap();
        assert!(store.get_by_name("a").unwrap().default);

        let mut b = login("b", "t2");
        b.default = true;
        store.add(b).unwrap();
        store.add(login("c", "t3")).unwrap();
        assert_eq!(store.logins().iter().filter(|l| l.default).count(), 1);
        assert_eq!(store.get_default().unwrap().name, "b");

        store.set_default("c").unwrap();
        assert_eq!(store.logins().iter().filter(|l| l.default).count(), 1);
        assert_eq!(store.get_default().unwrap().name, "c");

        assert!(matches!(store.set_default("zzz"), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_get_default_falls_back_to_first() {
        let store = ConfigStore::new(
            PathBuf::from("unused.yml"),
            Config {
                logins: vec![login("first", "t1"), login("second", "t2")],
            },
        );
        assert_eq!(store.get_default().unwrap().name, "first");
    }

    #[test]
    fn test_delete() {
        let temp = TempDir::new().unwrap();
        let mut store = empty_store(&temp);
        store.add(login("a", "t1")).unwrap();

        assert!(matches!(store.delete("missing"), Err(ConfigError::NotFound(_))));
        let removed = store.delete("a").unwrap();
        assert_eq!(removed.name, "a");

        let reloaded = ConfigStore::load_from(store.path().to_path_buf(), None).unwrap();
        assert!(reloaded.logins().is_empty());
    }

    #[test]
    fn test_generate_login_name() {
        let temp = TempDir::new().unwrap();
        let mut store = empty_store(&temp);
        assert_eq!(
            store.generate_login_name("https://gitea.com", "alice").unwrap(),
            "gitea.com"
        );

        store.add(login("gitea.com", "t1")).unwrap();
        assert_eq!(
            store.generate_login_name("https://gitea.com", "alice").unwrap(),
            "gitea.com_alice"
        );
        assert_eq!(
            store.generate_login_name("https://gitea.com", "").unwrap(),
            "gitea.com"
        );
        assert_eq!(
            store.generate_login_name("http://localhost:3000", "").unwrap(),
            "localhost:3000"
        );
    }

    #[test]
    fn test_login_ssh_host() {
        let mut l = login("a", "t");
        assert_eq!(l.ssh_host(), "gitea.com");
        l.ssh_host = "ssh.gitea.com".to_string();
        assert_eq!(l.ssh_host(), "ssh.gitea.com");
        assert!(!l.has_ssh_key());
    }
}
