//
//  tea-cli
//  cli/login.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Login management commands.
//!
//! A login is a named forge URL plus API token, stored in the config file.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::GiteaConnector;
use crate::auth::ssh_dir;
use crate::config::{ConfigError, ConfigStore, Login};
use crate::interactive::{can_prompt, prompt_confirm, prompt_password};
use crate::output::{format_bool, OutputWriter, TableBuilder, TableOutput};
use crate::task::{create_login, CreateLoginOptions};
use crate::util::format_time;

use super::GlobalOptions;

/// Manage logins for Gitea instances.
#[derive(Args, Debug)]
pub struct LoginCommand {
    #[command(subcommand)]
    pub command: LoginSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum LoginSubcommand {
    /// Add a login
    Add(AddArgs),

    /// List logins
    #[command(visible_alias = "ls")]
    List,

    /// Remove a login
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),

    /// Show or set the default login
    Default(DefaultArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Login name; defaults to the host of the URL
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Gitea URL, e.g. https://gitea.com
    #[arg(long, short = 'u', env = "GITEA_SERVER_URL")]
    pub url: String,

    /// API token; created from --user and --password when absent
    #[arg(long, short = 't', env = "GITEA_SERVER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// User name for creating a token
    #[arg(long)]
    pub user: Option<String>,

    /// Password for creating a token; prompted for when absent
    #[arg(long, env = "GITEA_SERVER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Private key for SSH transport; a registered key in ~/.ssh is used when absent
    #[arg(long, short = 's')]
    pub ssh_key: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, short = 'i')]
    pub insecure: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Name of the login
    pub name: String,

    /// Skip confirmation prompt
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Args, Debug)]
pub struct DefaultArgs {
    /// Login to make the default; shows the current default when absent
    pub name: Option<String>,
}

impl LoginCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let writer = OutputWriter::new(global.output);
        match &self.command {
            LoginSubcommand::Add(args) => add(args, &writer).await,
            LoginSubcommand::List => list(&writer),
            LoginSubcommand::Delete(args) => delete(args, &writer),
            LoginSubcommand::Default(args) => default(args, &writer),
        }
    }
}

async fn add(args: &AddArgs, writer: &OutputWriter) -> Result<()> {
    let mut store = ConfigStore::load()?;

    let token = args.token.clone().unwrap_or_default();
    let user = args.user.clone().unwrap_or_default();
    let mut password = args.password.clone().unwrap_or_default();
    if token.is_empty() && !user.is_empty() && password.is_empty() && can_prompt() {
        password = prompt_password(&format!("Password for {user}"))?;
    }

    let options = CreateLoginOptions {
        name: args.name.clone().unwrap_or_default(),
        url: args.url.clone(),
        token,
        user,
        password,
        ssh_key: args.ssh_key.clone().unwrap_or_default(),
        insecure: args.insecure,
    };
    let created = create_login(&mut store, &GiteaConnector, options, &ssh_dir()).await?;

    if let Some(warning) = &created.warning {
        writer.write_warning(warning);
    }
    let login = &created.login;
    writer.write_success(&format!(
        "Login as {} on {} successful. Added this login as {}",
        login.user, login.url, login.name
    ));
    if login.has_ssh_key() {
        writer.write_info(&format!("Using SSH key {}", login.ssh_key));
    }
    Ok(())
}

/// A login as listed; the token is never shown.
#[derive(Debug, Serialize)]
struct LoginRow {
    name: String,
    url: String,
    ssh_host: String,
    user: String,
    default: bool,
    created: String,
}

impl From<&Login> for LoginRow {
    fn from(login: &Login) -> Self {
        Self {
            name: login.name.clone(),
            url: login.url.clone(),
            ssh_host: login.ssh_host(),
            user: login.user.clone(),
            default: login.default,
            created: format_time(login.created),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct LoginList(Vec<LoginRow>);

impl TableOutput for LoginList {
    fn table(&self, color: bool) -> String {
        TableBuilder::new()
            .color(color)
            .headers(["Name", "URL", "SSH Host", "User", "Default", "Created"])
            .rows(self.0.iter().map(|row| {
                [
                    row.name.clone(),
                    row.url.clone(),
                    row.ssh_host.clone(),
                    row.user.clone(),
                    format_bool(row.default, color),
                    row.created.clone(),
                ]
            }))
            .build()
            .to_string()
    }
}

fn list(writer: &OutputWriter) -> Result<()> {
    let store = ConfigStore::load()?;
    if store.logins().is_empty() {
        writer.write_info("No logins configured. Run 'tea login add' to add one.");
        return Ok(());
    }
    writer.write(&LoginList(store.logins().iter().map(LoginRow::from).collect()))
}

fn delete(args: &DeleteArgs, writer: &OutputWriter) -> Result<()> {
    let mut store = ConfigStore::load()?;
    if store.get_by_name(&args.name).is_none() {
        return Err(ConfigError::NotFound(args.name.clone()).into());
    }
    if needs_confirmation(args.confirm, can_prompt())
        && !prompt_confirm(&format!("Are you sure you want to delete login '{}'?", args.name))?
    {
        writer.write_info("Cancelled.");
        return Ok(());
    }
    let removed = store.delete(&args.name)?;
    writer.write_success(&format!("Removed login {}", removed.name));
    Ok(())
}

/// Deleting asks first unless `--confirm` is given or nobody can answer.
fn needs_confirmation(confirm_flag: bool, interactive: bool) -> bool {
    !confirm_flag && interactive
}

fn default(args: &DefaultArgs, writer: &OutputWriter) -> Result<()> {
    let mut store = ConfigStore::load()?;
    match &args.name {
        Some(name) => {
            store.set_default(name)?;
            writer.write_success(&format!("Default login is now {name}"));
        }
        None => {
            let login = store.get_default()?;
            writer.write_info(&format!("Default login: {}", login.name));
        }
    }
    Ok(())
}
