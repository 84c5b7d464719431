//! Pull request checkout.
//!
//! Two ways to produce the tree a pull request would create when merged:
//!
//! - **Auto-merge** checks out the merge commit the hosting provider already
//!   computed (`pull/<id>/merge` on GitHub-style hosts).
//! - **Manual-merge** fetches the destination and source branches and merges
//!   them locally.
//!
//! Manual merge is preferred when requested, except for pull requests from a
//! private fork: its commits cannot be fetched without credentials for the
//! fork, so the provider's merge ref is the only way to build them.

use crate::config::CheckoutRequest;
use crate::error::{Error, Result};
use crate::phases::shallow::{fetch_failed, fetch_with_fallback, FetchDepth};
use crate::remote_url::{is_fork, looks_private};
use crate::repository::{FetchRequest, GitOperations};
use log::{info, warn};
use serde::Serialize;
use std::fmt;

/// Remote added for the source repository of a forked pull request.
pub const FORK_REMOTE: &str = "fork";

/// How a pull request gets merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    Auto,
    Manual,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Auto => f.write_str("auto-merge"),
            MergeStrategy::Manual => f.write_str("manual merge"),
        }
    }
}

/// Whether the pull request source repository needs credentials to read.
///
/// An explicit setting wins; otherwise SSH remotes are treated as private.
pub fn source_is_private(request: &CheckoutRequest) -> bool {
    request
        .pr_repository_private
        .unwrap_or_else(|| looks_private(&request.pr_repository_url))
}

/// Auto-merge unless manual merge was requested, and even then auto-merge
/// when the source is a private fork.
pub fn choose_strategy(request: &CheckoutRequest) -> MergeStrategy {
    if !request.manual_merge {
        return MergeStrategy::Auto;
    }

    let fork = is_fork(&request.repository_url, &request.pr_repository_url);
    if fork && source_is_private(request) {
        MergeStrategy::Auto
    } else {
        MergeStrategy::Manual
    }
}

/// Merges the pull request described by `request` with the strategy
/// `choose_strategy` picks. HEAD is detached afterwards for auto-merge; the
/// orchestrator detaches it for both strategies.
pub fn merge(git: &dyn GitOperations, request: &CheckoutRequest) -> Result<MergeStrategy> {
    let strategy = choose_strategy(request);
    info!("Merging pull request using {}", strategy);

    match strategy {
        MergeStrategy::Auto => auto_merge(git, request)?,
        MergeStrategy::Manual => manual_merge(git, request)?,
    }
    Ok(strategy)
}

fn auto_merge(git: &dyn GitOperations, request: &CheckoutRequest) -> Result<()> {
    let merge_ref = if !request.pr_merge_branch.is_empty() {
        request.pr_merge_branch.clone()
    } else if let Some(id) = request.pr_id {
        format!("pull/{}/merge", id)
    } else {
        return Err(Error::config(
            "auto-merge needs pull_request_merge_branch or pull_request_id",
        ));
    };

    let unresolvable = |err: Error| Error::MergeRefUnresolvable {
        r#ref: merge_ref.clone(),
        message: err.to_string(),
    };

    let fetch = FetchRequest::new("origin", Some(&merge_ref), request.clone_depth);
    fetch_with_fallback(git, &fetch).map_err(unresolvable)?;
    git.checkout("FETCH_HEAD", true).map_err(unresolvable)?;
    Ok(())
}

fn manual_merge(git: &dyn GitOperations, request: &CheckoutRequest) -> Result<()> {
    if request.branch_dest.is_empty() {
        return Err(Error::config("manual merge needs branch_dest"));
    }

    let source_ref = if !request.pr_merge_branch.is_empty() {
        request.pr_merge_branch.clone()
    } else if !request.branch.is_empty() {
        request.branch.clone()
    } else if let Some(id) = request.pr_id {
        format!("pull/{}/head", id)
    } else {
        return Err(Error::config(
            "manual merge needs pull_request_merge_branch, branch or pull_request_id",
        ));
    };

    let source_remote = if is_fork(&request.repository_url, &request.pr_repository_url) {
        add_fork_remote(git, &request.pr_repository_url)?;
        FORK_REMOTE
    } else {
        "origin"
    };

    let dest = FetchRequest::new("origin", Some(&request.branch_dest), request.clone_depth);
    let source = FetchRequest::new(source_remote, Some(&source_ref), request.clone_depth);
    let dest_depth = fetch_with_fallback(git, &dest).map_err(|e| fetch_failed(&dest, e))?;
    let source_depth = fetch_with_fallback(git, &source).map_err(|e| fetch_failed(&source, e))?;

    let merged = merge_into_destination(git, request);
    let shallow = request.clone_depth > 0
        && (dest_depth == FetchDepth::AsRequested || source_depth == FetchDepth::AsRequested);
    match merged {
        Err(err) if shallow => {
            // Shallow tips often share no merge base
            warn!(
                "Merge failed at depth {}, fetching full history: {}",
                request.clone_depth, err
            );
            git.reset_hard().map_err(|e| merge_conflict(merge_target(request), e))?;

            // The source is fetched last so FETCH_HEAD points at it
            let dest = dest.full_history();
            let source = source.full_history();
            git.fetch(&dest).map_err(|e| fetch_failed(&dest, e))?;
            git.fetch(&source).map_err(|e| fetch_failed(&source, e))?;
            merge_into_destination(git, request)
        }
        other => other,
    }
}

/// Checks out the freshly fetched `origin/<dest>` detached and merges the
/// source into it. Local branches in the clone directory are never used.
fn merge_into_destination(git: &dyn GitOperations, request: &CheckoutRequest) -> Result<()> {
    let upstream = format!("origin/{}", request.branch_dest);
    git.checkout(&upstream, true)
        .map_err(|e| Error::CheckoutFailed {
            r#ref: upstream.clone(),
            message: e.to_string(),
        })?;

    let target = merge_target(request);
    git.merge(target).map_err(|e| merge_conflict(target, e))
}

/// A commit pins the exact pull request head that triggered the build.
fn merge_target(request: &CheckoutRequest) -> &str {
    if request.commit.is_empty() {
        "FETCH_HEAD"
    } else {
        request.commit.as_str()
    }
}

fn merge_conflict(target: &str, err: Error) -> Error {
    Error::MergeConflict {
        r#ref: target.to_string(),
        message: err.to_string(),
    }
}

fn add_fork_remote(git: &dyn GitOperations, url: &str) -> Result<()> {
    let existing = git.remote_url(FORK_REMOTE).map_err(Error::remote_setup)?;
    let added = match existing.as_deref() {
        None => git.remote_add(FORK_REMOTE, url),
        Some(current) if current == url => Ok(()),
        Some(_) => git.config_set(&format!("remote.{}.url", FORK_REMOTE), url),
    };
    added.map_err(Error::remote_setup)
}
