//
//  tea-cli
//  cli/pr.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pull request commands.
//!
//! Every command works against the repository resolved from `--repo` or the
//! working copy. `checkout` and `clean` also need a local checkout.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use crate::api::gitea::PullRequest;
use crate::api::{ForgeConnector, GiteaConnector};
use crate::context::{FetchOutcome, Requirement};
use crate::output::{format_field, OutputWriter, TableOutput};
use crate::task::{pull_checkout, pull_clean, pull_create, PullCreateOptions};

use super::{passphrase_prompt, resolve_context, GlobalOptions};

/// Work with pull requests.
#[derive(Args, Debug)]
pub struct PullsCommand {
    #[command(subcommand)]
    pub command: PullsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PullsSubcommand {
    /// Check out a pull request into a local branch
    #[command(visible_alias = "co")]
    Checkout(CheckoutArgs),

    /// Delete the local and remote branch of a closed pull request
    Clean(CleanArgs),

    /// Create a pull request from the current branch
    #[command(visible_alias = "c")]
    Create(CreateArgs),
}

#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// Pull request number
    #[arg(value_parser = parse_index)]
    pub index: i64,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Pull request number
    #[arg(value_parser = parse_index)]
    pub index: i64,

    /// Find the local branch by name instead of by the head commit
    #[arg(long)]
    pub ignore_sha: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Target branch; defaults to the repository's default branch
    #[arg(long, short = 'b')]
    pub base: Option<String>,

    /// Source branch as BRANCH or OWNER:BRANCH; defaults to the current branch
    #[arg(long)]
    pub head: Option<String>,

    /// Title; derived from the head branch when absent
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Comma-separated user names to assign
    #[arg(long, short = 'a', value_delimiter = ',')]
    pub assignees: Vec<String>,

    /// Comma-separated label IDs
    #[arg(long, short = 'L', value_delimiter = ',')]
    pub labels: Vec<i64>,

    /// Milestone ID
    #[arg(long, short = 'm', default_value_t = 0)]
    pub milestone: i64,

    /// Deadline as an RFC 3339 timestamp
    #[arg(long, short = 'D')]
    pub deadline: Option<DateTime<Utc>>,
}

impl PullsCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            PullsSubcommand::Checkout(args) => checkout(args, global).await,
            PullsSubcommand::Clean(args) => clean(args, global).await,
            PullsSubcommand::Create(args) => create(args, global).await,
        }
    }
}

/// Accepts `7` as well as `#7`.
fn parse_index(s: &str) -> Result<i64, String> {
    let digits = s.trim().trim_start_matches('#');
    match digits.parse::<i64>() {
        Ok(index) if index > 0 => Ok(index),
        _ => Err(format!("'{s}' is not a pull request number")),
    }
}

async fn checkout(args: &CheckoutArgs, global: &GlobalOptions) -> Result<()> {
    let ctx = resolve_context(global)?;
    ctx.ensure(&[Requirement::LocalRepo, Requirement::RemoteRepo]);
    let writer = OutputWriter::new(ctx.output);
    let api = GiteaConnector.connect_login(&ctx.login)?;

    let outcome = pull_checkout(
        api.as_ref(),
        &ctx.login,
        ctx.local_repo()?,
        &ctx.owner,
        &ctx.name,
        args.index,
        passphrase_prompt(),
    )
    .await?;

    if outcome.fetch == FetchOutcome::UpToDate {
        writer.write_info(&format!("Remote '{}' is already up to date", outcome.remote));
    }
    if outcome.existed {
        writer.write_warning(&format!(
            "branch '{}' already existed; there may be changes since you last checked out, \
             run `git pull` to get them",
            outcome.branch
        ));
    }
    writer.write_success(&format!(
        "Checked out pull request #{} as '{}'",
        args.index, outcome.branch
    ));
    Ok(())
}

async fn clean(args: &CleanArgs, global: &GlobalOptions) -> Result<()> {
    let ctx = resolve_context(global)?;
    ctx.ensure(&[Requirement::LocalRepo, Requirement::RemoteRepo]);
    let writer = OutputWriter::new(ctx.output);
    let api = GiteaConnector.connect_login(&ctx.login)?;

    let outcome = pull_clean(
        api.as_ref(),
        &ctx.login,
        ctx.local_repo()?,
        &ctx.owner,
        &ctx.name,
        args.index,
        args.ignore_sha,
        passphrase_prompt(),
    )
    .await?;

    if let Some(default_branch) = &outcome.switched_to {
        writer.write_info(&format!(
            "Checked out '{default_branch}' to delete local branch '{}'",
            outcome.branch
        ));
    }
    writer.write_success(&format!("Deleted local branch {}", outcome.branch));
    if let Some(remote_branch) = &outcome.remote_branch {
        writer.write_success(&format!("Deleted remote branch {remote_branch}"));
    }
    Ok(())
}

async fn create(args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
    let ctx = resolve_context(global)?;
    ctx.ensure(&[Requirement::RemoteRepo]);
    let writer = OutputWriter::new(ctx.output);
    let api = GiteaConnector.connect_login(&ctx.login)?;

    let options = PullCreateOptions {
        base: args.base.clone().unwrap_or_default(),
        head: args.head.clone().unwrap_or_default(),
        title: args.title.clone().unwrap_or_default(),
        description: args.description.clone().unwrap_or_default(),
        assignees: args.assignees.clone(),
        labels: args.labels.clone(),
        milestone: args.milestone,
        deadline: args.deadline,
    };
    let pr = pull_create(api.as_ref(), ctx.local.as_ref(), &ctx.owner, &ctx.name, options).await?;
    writer.write(&pr)
}

impl TableOutput for PullRequest {
    fn table(&self, color: bool) -> String {
        let mut lines = vec![format!("#{} {}", self.number, self.title)];
        if !self.head.ref_name.is_empty() || !self.base.ref_name.is_empty() {
            lines.push(format_field(
                "Branches",
                &format!("{} -> {}", self.head.ref_name, self.base.ref_name),
                color,
            ));
        }
        lines.push(format_field("State", &self.state.to_string(), color));
        if !self.html_url.is_empty() {
            lines.push(self.html_url.clone());
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("7"), Ok(7));
        assert_eq!(parse_index("#12"), Ok(12));
        assert!(parse_index("0").is_err());
        assert!(parse_index("abc").is_err());
    }

    #[test]
    fn test_pull_request_table() {
        let pr = PullRequest {
            number: 3,
            title: "Fix Login Page".to_string(),
            html_url: "https://gitea.com/gitea/tea/pulls/3".to_string(),
            ..PullRequest::default()
        };
        let table = pr.table(false);
        assert!(table.starts_with("#3 Fix Login Page"));
        assert!(table.contains("State: open"));
        assert!(table.ends_with("https://gitea.com/gitea/tea/pulls/3"));
    }
}
