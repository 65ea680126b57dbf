//
//  tea-cli
//  cli/whoami.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Show the forge user behind the active login.

use anyhow::{Context, Result};
use clap::Args;

use crate::api::gitea::User;
use crate::api::{ForgeConnector, GiteaConnector};
use crate::output::{format_field, OutputWriter, TableOutput};

use super::{resolve_context, GlobalOptions};

/// Show the user of the current login.
#[derive(Args, Debug)]
pub struct WhoamiCommand {}

impl WhoamiCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let ctx = resolve_context(global)?;
        let api = GiteaConnector.connect_login(&ctx.login)?;
        let user = api
            .whoami()
            .await
            .with_context(|| format!("could not verify login '{}'", ctx.login.name))?;
        OutputWriter::new(ctx.output).write(&user)
    }
}

impl TableOutput for User {
    fn table(&self, color: bool) -> String {
        let mut lines = vec![format!("Signed in as {}", self.login)];
        if !self.full_name.is_empty() {
            lines.push(format_field("Name", &self.full_name, color));
        }
        if !self.email.is_empty() {
            lines.push(format_field("Email", &self.email, color));
        }
        if self.is_admin {
            lines.push(format_field("Admin", "yes", color));
        }
        lines.join("\n")
    }
}
