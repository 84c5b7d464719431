//! Remote URL helpers.
//!
//! Covers the three things the checkout needs to know about a URL without
//! talking to the hosting provider: how to embed HTTP credentials into it,
//! which owner/namespace it belongs to (for fork detection), and whether it
//! looks like a private SSH remote.
//!
//! Both URL shapes CI systems hand out are understood:
//! - `scheme://[user[:pass]@]host[:port]/owner/repo[.git]`
//! - scp-like `user@host:owner/repo[.git]`

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn scp_like() -> &'static Regex {
    static SCP_LIKE: OnceLock<Regex> = OnceLock::new();
    SCP_LIKE.get_or_init(|| {
        Regex::new(r"^(?:[^@/\s]+@)?([^:/\s]+):([^/].*)$").expect("scp-like URL regex is valid")
    })
}

/// Embeds basic-auth credentials into an HTTP(S) URL.
///
/// The URL is returned unchanged unless both `user` and `token` are
/// non-empty and the scheme is `http` or `https`.
pub fn with_http_credentials(url: &str, user: &str, token: &str) -> Result<String> {
    if user.is_empty() || token.is_empty() || !url.starts_with("http") {
        return Ok(url.to_string());
    }

    let mut parsed = Url::parse(url)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Ok(url.to_string());
    }

    parsed
        .set_username(user)
        .and_then(|()| parsed.set_password(Some(token)))
        .map_err(|()| {
            Error::config(format!(
                "cannot embed credentials into {}",
                mask_credentials(url)
            ))
        })?;
    Ok(parsed.to_string())
}

/// Replaces any password embedded in the URL with `***` for logging.
pub fn mask_credentials(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        _ => url.to_string(),
    }
}

/// Returns the lowercased namespace (owner, org or group path) of a
/// repository URL, i.e. every path segment except the repository itself.
pub fn repository_owner(url: &str) -> Option<String> {
    let url = url.trim();

    let path = if let Some(caps) = scp_like().captures(url).filter(|_| !url.contains("://")) {
        caps.get(2)?.as_str().to_string()
    } else {
        Url::parse(url).ok()?.path().to_string()
    };

    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match segments.split_last() {
        Some((_repo, namespace)) if !namespace.is_empty() => {
            Some(namespace.join("/").to_lowercase())
        }
        _ => None,
    }
}

/// Whether a pull request coming from `source_url` is a fork of
/// `target_url`.
///
/// An empty source is never a fork. When either owner cannot be determined
/// the normalised URLs are compared instead.
pub fn is_fork(target_url: &str, source_url: &str) -> bool {
    if source_url.trim().is_empty() {
        return false;
    }

    match (repository_owner(target_url), repository_owner(source_url)) {
        (Some(target), Some(source)) => target != source,
        _ => normalize(target_url) != normalize(source_url),
    }
}

/// Whether the URL points at an SSH remote, which CI providers only hand out
/// for repositories that need credentials to read.
pub fn looks_private(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("ssh://") || (!url.contains("://") && scp_like().is_match(url))
}

fn normalize(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed
        .strip_suffix(".git")
        .unwrap_or(trimmed)
        .to_lowercase()
}
