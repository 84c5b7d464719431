//! # Checkout Request
//!
//! This module defines `CheckoutRequest`, the immutable description of the
//! version-control state a CI job wants its working directory to be in. The
//! binary assembles it from command-line flags and environment variables; the
//! library only ever reads it.
//!
//! Text fields use the empty string for "not provided", matching how CI step
//! inputs arrive through the environment. The request is a pull request
//! request as soon as any of `pr_repository_url`, `pr_merge_branch` or
//! `pr_id` is set; in that case merge logic replaces plain ref checkout.

use crate::error::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Everything needed to bring a clone directory to the requested state.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    /// URL of the repository being built; becomes remote `origin`.
    pub repository_url: String,
    /// Directory the repository is initialised in.
    pub clone_dir: PathBuf,
    /// Commit SHA to check out. Takes precedence over `tag` and `branch`.
    pub commit: String,
    /// Tag to check out.
    pub tag: String,
    /// Branch to check out, or the pull request source branch.
    pub branch: String,
    /// Pull request destination branch.
    pub branch_dest: String,
    /// Pull request number.
    pub pr_id: Option<u64>,
    /// URL of the repository the pull request comes from.
    pub pr_repository_url: String,
    /// Provider-computed merge ref, e.g. `pull/42/merge`.
    pub pr_merge_branch: String,
    /// Explicit visibility of the pull request source repository.
    pub pr_repository_private: Option<bool>,
    /// Hard reset and clean an existing checkout before fetching.
    pub reset_repository: bool,
    /// History depth for fetches; `0` fetches everything.
    pub clone_depth: u32,
    /// Prefer merging pull requests locally over the provider's merge ref.
    pub manual_merge: bool,
    /// Initialise and update submodules after checkout.
    pub update_submodules: bool,
    /// Verify TLS certificates on HTTP remotes.
    pub ssl_verify: bool,
    /// Basic-auth user for HTTP remotes.
    pub http_user: String,
    /// Basic-auth token for HTTP remotes.
    #[serde(skip_serializing)]
    pub http_token: String,
}

impl Default for CheckoutRequest {
    /// Mirrors the CLI defaults: manual merge, submodules and TLS
    /// verification on, full history, no reset.
    fn default() -> Self {
        Self {
            repository_url: String::new(),
            clone_dir: PathBuf::new(),
            commit: String::new(),
            tag: String::new(),
            branch: String::new(),
            branch_dest: String::new(),
            pr_id: None,
            pr_repository_url: String::new(),
            pr_merge_branch: String::new(),
            pr_repository_private: None,
            reset_repository: false,
            clone_depth: 0,
            manual_merge: true,
            update_submodules: true,
            ssl_verify: true,
            http_user: String::new(),
            http_token: String::new(),
        }
    }
}

impl CheckoutRequest {
    /// Checks the inputs every run needs, before any git command is issued.
    pub fn validate(&self) -> Result<()> {
        if self.repository_url.trim().is_empty() {
            return Err(Error::config("repository_url is required"));
        }
        if self.clone_dir.as_os_str().is_empty() {
            return Err(Error::config("clone_dir is required"));
        }
        Ok(())
    }

    /// Whether pull request merge logic applies to this request.
    pub fn is_pr_request(&self) -> bool {
        !self.pr_repository_url.is_empty()
            || !self.pr_merge_branch.is_empty()
            || self.pr_id.is_some()
    }
}

/// Parses the yes/no style flags CI step inputs use.
pub fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "true" => Ok(true),
        "no" | "false" => Ok(false),
        other => Err(format!("expected yes or no, got '{}'", other)),
    }
}
