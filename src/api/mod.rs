//
//  tea-cli
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module provides the forge REST API used by the CLI.
//!
//! ## Architecture
//!
//! The API layer is organized as follows:
//!
//! - [`forge`]: The [`ForgeApi`] operations and the [`ForgeConnector`] factory
//! - [`client`]: [`GiteaClient`], the HTTP implementation against `/api/v1`
//! - [`gitea`]: Request and response types
//! - [`common`]: [`ApiError`] and error body parsing
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tea_cli::api::{ForgeConnector, GiteaConnector};
//! use tea_cli::config::ConfigStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = ConfigStore::load()?;
//! let api = GiteaConnector.connect_login(store.get_default()?)?;
//! let repo = api.get_repo("gitea", "tea").await?;
//! println!("{}", repo.html_url);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! API errors are returned as [`ApiError`] variants, which map to common HTTP error scenarios:
//!
//! - `AuthFailed`: 401 Unauthorized
//! - `Forbidden`: 403 Forbidden
//! - `NotFound`: 404 Not Found
//! - `Conflict`: 409 Conflict
//! - `RateLimited`: 429 Too Many Requests
//! - `BadRequest`: 400 and 422
//! - `ServerError`: 5xx Server Errors

pub mod client;
pub mod common;
pub mod forge;
pub mod gitea;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{GiteaClient, GiteaConnector};
pub use common::ApiError;
pub use forge::{ForgeApi, ForgeConnector};
