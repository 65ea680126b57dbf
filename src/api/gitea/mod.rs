//
//  tea-cli
//  api/gitea/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Gitea API v1 types.
//!
//! Every field is `#[serde(default)]`: Gitea and Forgejo versions differ in
//! which fields they send, and a missing field must not fail a command that
//! does not look at it.

pub mod pulls;
pub mod repositories;
pub mod users;

pub use pulls::*;
pub use repositories::*;
pub use users::*;
