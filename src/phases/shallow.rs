//! Depth-limited checkout of a branch, tag or commit.
//!
//! The target ref is fetched with at most `clone_depth` commits of history
//! and then checked out. Some hosts cannot serve annotated tags or arbitrary
//! commits inside a shallow window, so a failed shallow fetch, or a checkout
//! that cannot find its ref after one, is retried once with complete
//! history. That single retry is the only failure this crate recovers from.

use crate::error::{Error, Result};
use crate::refs::{CheckoutMode, CheckoutTarget};
use crate::repository::{FetchRequest, GitOperations};
use log::{info, warn};

/// How a successful fetch ended up being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDepth {
    /// The requested depth was enough (or complete history was requested).
    AsRequested,
    /// The shallow fetch failed and complete history was fetched instead.
    FullHistory,
}

/// Runs `request`, retrying exactly once with complete history when a
/// shallow fetch fails. A failure at depth 0 is returned as-is.
pub fn fetch_with_fallback(git: &dyn GitOperations, request: &FetchRequest) -> Result<FetchDepth> {
    match git.fetch(request) {
        Ok(()) => Ok(FetchDepth::AsRequested),
        Err(err) if request.depth > 0 => {
            warn!(
                "Fetch of {} failed, retrying with full history: {}",
                request, err
            );
            git.fetch(&request.full_history())?;
            Ok(FetchDepth::FullHistory)
        }
        Err(err) => Err(err),
    }
}

/// The fetch that makes `target` available locally.
pub fn fetch_request(target: &CheckoutTarget, branch: &str, depth: u32) -> FetchRequest {
    match target.mode {
        CheckoutMode::Branch => FetchRequest::new("origin", Some(&target.r#ref), depth),
        CheckoutMode::Tag => {
            let refspec = format!("refs/tags/{0}:refs/tags/{0}", target.r#ref);
            FetchRequest::new("origin", Some(&refspec), depth)
        }
        CheckoutMode::Commit | CheckoutMode::None => {
            let branch = Some(branch).filter(|b| !b.is_empty());
            FetchRequest::new("origin", branch, depth)
        }
    }
}

/// Brings the working tree to `target`. Does nothing for `CheckoutMode::None`.
///
/// `branch` is the branch input of the request; for commit checkouts it
/// narrows what gets fetched.
pub fn checkout(
    git: &dyn GitOperations,
    target: &CheckoutTarget,
    branch: &str,
    depth: u32,
) -> Result<()> {
    if target.is_none() {
        info!("No commit, tag or branch specified, skipping checkout");
        return Ok(());
    }

    info!("Checking out {} {}", target.mode, target.r#ref);

    let request = fetch_request(target, branch, depth);
    let fetched = fetch_with_fallback(git, &request).map_err(|e| fetch_failed(&request, e))?;

    if let Err(err) = git.checkout(&target.r#ref, false) {
        if depth == 0 || fetched == FetchDepth::FullHistory {
            return Err(checkout_failed(target, err));
        }

        warn!(
            "Checkout of {} failed at depth {}, fetching full history: {}",
            target.r#ref, depth, err
        );
        let full = request.full_history();
        git.fetch(&full).map_err(|e| fetch_failed(&full, e))?;
        git.checkout(&target.r#ref, false)
            .map_err(|e| checkout_failed(target, e))?;
    }

    if target.mode == CheckoutMode::Branch {
        // Pick up commits that landed between fetch and checkout
        let upstream = format!("origin/{}", target.r#ref);
        git.merge(&upstream).map_err(|e| Error::MergeConflict {
            r#ref: upstream.clone(),
            message: e.to_string(),
        })?;
    }

    Ok(())
}

pub(crate) fn fetch_failed(request: &FetchRequest, err: Error) -> Error {
    Error::FetchFailed {
        remote: request.remote.clone(),
        refspec: request.refspec.clone().unwrap_or_default(),
        message: err.to_string(),
    }
}

fn checkout_failed(target: &CheckoutTarget, err: Error) -> Error {
    Error::CheckoutFailed {
        r#ref: target.r#ref.clone(),
        message: err.to_string(),
    }
}
