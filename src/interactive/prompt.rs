//
//  tea-cli
//  interactive/prompt.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Interactive Prompts Module
//!
//! Wraps the `dialoguer` crate to offer a consistent interface for password
//! entry and confirmations.
//!
//! [`prompt_password`] has the shape of [`PasswordPrompt`](crate::auth::PasswordPrompt)
//! and is what git transport uses to ask for SSH key passphrases.
//!
//! # Example
//!
//! ```no_run
//! use tea_cli::interactive::{can_prompt, prompt_password};
//!
//! if can_prompt() {
//!     let passphrase = prompt_password("Passphrase for ~/.ssh/id_ed25519")?;
//!     println!("read {} characters", passphrase.len());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::io::IsTerminal;

use anyhow::Result;
use dialoguer::{Confirm, Password};

/// Masked text entry.
pub fn prompt_password(message: &str) -> Result<String> {
    let password = Password::new()
        .with_prompt(message)
        .allow_empty_password(true)
        .interact()?;
    Ok(password)
}

/// Yes/no question defaulting to no.
pub fn prompt_confirm(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()?;
    Ok(confirmed)
}

/// Whether stdin and stderr are attached to a terminal, so prompts can be shown.
pub fn can_prompt() -> bool {
    std::io::stdin().is_terminal() && console::user_attended_stderr()
}
