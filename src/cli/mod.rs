//
//  tea-cli
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod clone;
mod login;
mod pr;
mod whoami;

pub use clone::CloneCommand;
pub use login::LoginCommand;
pub use pr::PullsCommand;
pub use whoami::WhoamiCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::auth::PasswordPrompt;
use crate::config::ConfigStore;
use crate::context::{ContextResolver, ResolvedContext};
use crate::interactive::{can_prompt, prompt_password};
use crate::output::OutputFormat;

/// tea - Work with Gitea from the command line
#[derive(Parser, Debug)]
#[command(
    name = "tea",
    version,
    about = "Work with Gitea from the command line",
    long_about = "tea is a CLI for Gitea and compatible forges.\n\n\
                  It picks the login and repository from your working copy and brings \
                  pull requests, clones and forks to your terminal.",
    propagate_version = true,
    after_help = "Use 'tea <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Use a different login than the one matching the repository
    #[arg(long, short = 'l', global = true, env = "TEA_LOGIN")]
    pub login: Option<String>,

    /// Repository as OWNER/NAME or NAME, or a path to a local checkout
    #[arg(long, short = 'r', global = true, env = "TEA_REPO")]
    pub repo: Option<String>,

    /// Git remote to discover the repository from
    #[arg(long, short = 'R', global = true, env = "TEA_REMOTE")]
    pub remote: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        global = true,
        env = "TEA_OUTPUT",
        value_enum,
        default_value_t = OutputFormat::Table
    )]
    pub output: OutputFormat,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage logins for Gitea instances
    Login(LoginCommand),

    /// Show the user of the current login
    Whoami(WhoamiCommand),

    /// Clone a repository, wiring forks to their parent
    #[command(visible_alias = "C")]
    Clone(CloneCommand),

    /// Manage pull requests
    #[command(visible_aliases = ["pull", "pr"])]
    Pulls(PullsCommand),

    /// Print version information
    Version,
}

/// Resolves login and repository for a command from the config and the
/// working directory.
pub(crate) fn resolve_context(global: &GlobalOptions) -> Result<ResolvedContext> {
    let store = ConfigStore::load()?;
    let ctx = ContextResolver::new(&store).resolve(global)?;
    Ok(ctx)
}

/// Passphrase prompt handed to git transport; absent when nobody can answer.
pub(crate) fn passphrase_prompt() -> Option<PasswordPrompt<'static>> {
    if can_prompt() {
        Some(&prompt_password)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tea", "pulls", "checkout", "7", "--login", "work", "-r", "gitea/tea", "-o", "json",
        ])
        .unwrap();
        assert_eq!(cli.global.login.as_deref(), Some("work"));
        assert_eq!(cli.global.repo.as_deref(), Some("gitea/tea"));
        assert_eq!(cli.global.output, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Pulls(_)));
    }
}
