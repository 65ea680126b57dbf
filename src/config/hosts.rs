//
//  tea-cli
//  config/hosts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Forge base URL helpers.

use url::Url;

use super::ConfigError;

/// Normalizes a forge base URL as entered by the user.
///
/// A missing scheme defaults to `https`. The result carries scheme, host,
/// an optional port and any sub-path the forge is mounted under, without a
/// trailing slash.
///
/// # Example
///
/// ```rust
/// use tea_cli::config::normalize_base_url;
///
/// assert_eq!(normalize_base_url("gitea.com/").unwrap(), "https://gitea.com");
/// assert_eq!(
///     normalize_base_url("HTTP://example.com:3000/git/").unwrap(),
///     "http://example.com:3000/git"
/// );
/// ```
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    let invalid = |reason: &str| ConfigError::InvalidUrl(format!("{raw}: {reason}"));

    if raw.is_empty() {
        return Err(invalid("empty URL"));
    }
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let parsed = Url::parse(&with_scheme).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("only http and https are supported"));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query strings and fragments are not allowed"));
    }
    let host = parsed.host_str().ok_or_else(|| invalid("missing host"))?;

    let mut base = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        base.push_str(&format!(":{port}"));
    }
    base.push_str(parsed.path().trim_end_matches('/'));
    Ok(base)
}

/// Returns the `host[:port]` part of a base URL, the default login name.
pub fn url_host(base_url: &str) -> Option<String> {
    let parsed = Url::parse(base_url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Returns only the host name of a base URL.
pub fn url_hostname(base_url: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://gitea.com").unwrap(), "https://gitea.com");
        assert_eq!(normalize_base_url("https://gitea.com/").unwrap(), "https://gitea.com");
        assert_eq!(normalize_base_url(" gitea.com ").unwrap(), "https://gitea.com");
        assert_eq!(
            normalize_base_url("https://example.com/sub/").unwrap(),
            "https://example.com/sub"
        );
        assert_eq!(
            normalize_base_url("http://localhost:3000").unwrap(),
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects() {
        assert!(normalize_base_url("").is_err());
        assert!(normalize_base_url("ssh://gitea.com").is_err());
        assert!(normalize_base_url("https://gitea.com/?x=1").is_err());
    }

    #[test]
    fn test_url_host() {
        assert_eq!(url_host("https://gitea.com").as_deref(), Some("gitea.com"));
        assert_eq!(url_host("http://localhost:3000/x").as_deref(), Some("localhost:3000"));
        assert_eq!(url_hostname("http://localhost:3000/x").as_deref(), Some("localhost"));
        assert_eq!(url_host("not a url"), None);
    }
}
