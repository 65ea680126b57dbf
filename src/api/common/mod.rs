//
//  tea-cli
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API types shared by every forge operation.
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for all API operations
//! - [`error_message`] - Extracts the human readable part of an error body
//!
//! # Example
//!
//! ```rust
//! use tea_cli::api::ApiError;
//!
//! fn describe<T>(result: Result<T, ApiError>) -> String {
//!     match result {
//!         Ok(_) => "ok".to_string(),
//!         Err(e) if e.status() == Some(404) => "missing".to_string(),
//!         Err(e) => e.to_string(),
//!     }
//! }
//! ```

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by forge API operations.
///
/// Status based variants map one HTTP status (or class) each so callers can
/// react to a 404 or 409 without parsing messages.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Bad request: {message}")]
    BadRequest { status: u16, message: String },

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Unexpected response ({status}): {message}")]
    Unknown { status: u16, message: String },
}

impl ApiError {
    /// Maps a non-success response to an error.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = error_message(status, body);
        match status.as_u16() {
            401 => Self::AuthFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            429 => Self::RateLimited,
            code @ (400 | 422) => Self::BadRequest {
                status: code,
                message,
            },
            code @ 500..=599 => Self::ServerError {
                status: code,
                message,
            },
            code => Self::Unknown {
                status: code,
                message,
            },
        }
    }

    /// HTTP status behind this error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::RateLimited => Some(429),
            Self::BadRequest { status, .. }
            | Self::ServerError { status, .. }
            | Self::Unknown { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Extracts a user-friendly message from an error response body.
///
/// Gitea answers with `{"message": "...", "url": "..."}`; some proxies and
/// older versions use `{"error": "..."}`. Anything else is returned as is,
/// or the status reason when the body is empty.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error"] {
            if let Some(message) = json.get(field).and_then(|m| m.as_str()) {
                if !message.is_empty() {
                    return message.to_string();
                }
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        body.to_string()
    }
}
