//
//  tea-cli
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Common helpers used throughout the tea CLI.
//!
//! ## Categories
//!
//! - **Path Utilities**: [`expand_home`], [`absolute_path`], [`file_exists`],
//!   [`dir_exists`], [`path_exists`]
//! - **Time Utilities**: [`format_time`]
//! - **String Utilities**: [`title_case`]
//!
//! ## Example
//!
//! ```rust
//! use tea_cli::util::{format_time, title_case};
//!
//! let when = format_time(1704067200);
//! assert_eq!(title_case("fix login flow"), "Fix Login Flow");
//! ```

mod path;

pub use path::*;

use chrono::{DateTime, Local};

/// Formats a Unix timestamp into a human-readable local datetime string.
///
/// # Parameters
///
/// * `timestamp` - Seconds since the Unix epoch.
///
/// # Returns
///
/// A `String` in "YYYY-MM-DD HH:MM:SS" format, or "Unknown" for a zero or
/// unrepresentable timestamp.
///
/// # Notes
///
/// - Logins written by older clients have no `created` value; those show as "Unknown".
pub fn format_time(timestamp: i64) -> String {
    if timestamp <= 0 {
        return "Unknown".to_string();
    }
    if let Some(dt) = DateTime::from_timestamp(timestamp, 0) {
        let local: DateTime<Local> = dt.into();
        local.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        "Unknown".to_string()
    }
}

/// Upper-cases the first letter of every whitespace separated word.
///
/// The rest of each word is left as written, so `API` stays `API`.
///
/// # Example
///
/// ```rust
/// use tea_cli::util::title_case;
///
/// assert_eq!(title_case("add oAuth support"), "Add OAuth Support");
/// ```
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_unknown() {
        assert_eq!(format_time(0), "Unknown");
        assert_eq!(format_time(i64::MAX), "Unknown");
    }

    #[test]
    fn test_format_time_shape() {
        let formatted = format_time(1704067200);
        assert_eq!(formatted.len(), "2024-01-01 00:00:00".len());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("feature one"), "Feature One");
        assert_eq!(title_case("x"), "X");
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("keep  spacing"), "Keep  Spacing");
    }
}
