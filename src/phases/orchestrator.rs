//! Orchestrator for a complete checkout run
//!
//! This module sequences every phase into a single run against one clone
//! directory. Each step is a blocking call that completes before the next one
//! starts; the first error aborts the run.

use super::metadata::ExportedField;
use super::origin::OriginState;
use super::pull_request::MergeStrategy;
use super::{metadata, origin, pull_request, shallow, submodules};
use crate::config::CheckoutRequest;
use crate::error::{Error, Result};
use crate::export::ExportSink;
use crate::refs::{self, CheckoutTarget};
use crate::remote_url::mask_credentials;
use crate::repository::GitOperations;
use log::{info, warn};
use serde::Serialize;

/// What a successful run did.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReport {
    /// Ref resolved from commit/tag/branch. For pull requests this is
    /// context only; the merge decides the final tree.
    pub target: CheckoutTarget,
    pub pull_request: bool,
    pub strategy: Option<MergeStrategy>,
    /// Exported metadata in export order; empty when nothing was checked out.
    pub exported: Vec<ExportedField>,
}

/// Execute a complete checkout run
///
/// 1. Inspect `origin` and reset an existing checkout if requested
/// 2. Initialise the repository and add `origin`
/// 3. Disable TLS verification if requested
/// 4. Resolve the checkout target
/// 5. Shallow checkout, or pull request merge
/// 6. Update submodules
/// 7. Detach HEAD for pull request builds
/// 8. Export commit metadata
pub fn execute_checkout(
    request: &CheckoutRequest,
    git: &dyn GitOperations,
    sink: &mut dyn ExportSink,
) -> Result<CheckoutReport> {
    request.validate()?;

    // Step 1: Origin state
    let origin_state = OriginState::inspect(git)?;
    if origin_state.present && request.reset_repository {
        origin::reset(git)?;
    }

    // Step 2: Repository and remote
    git.init().map_err(Error::remote_setup)?;
    if !origin_state.present {
        info!(
            "Adding remote origin {}",
            mask_credentials(&request.repository_url)
        );
        git.remote_add("origin", &request.repository_url)
            .map_err(Error::remote_setup)?;
    } else if !origin_state.matches(&request.repository_url) {
        warn!(
            "Existing origin {} differs from {}, keeping it",
            mask_credentials(origin_state.url.as_deref().unwrap_or_default()),
            mask_credentials(&request.repository_url)
        );
    }

    // Step 3: TLS verification
    if !request.ssl_verify {
        git.config_set("http.sslVerify", "false")
            .map_err(Error::remote_setup)?;
    }

    // Step 4: Checkout target
    let target = refs::resolve(&request.commit, &request.tag, &request.branch);
    let is_pr = request.is_pr_request();

    // Step 5: Checkout or merge
    let strategy = if is_pr {
        Some(pull_request::merge(git, request)?)
    } else {
        shallow::checkout(git, &target, &request.branch, request.clone_depth)?;
        None
    };

    // Step 6: Submodules
    if request.update_submodules {
        submodules::update(git)?;
    }

    // Step 7: Never leave a pull request build on a local branch
    if is_pr {
        git.checkout("", true).map_err(|e| Error::CheckoutFailed {
            r#ref: "HEAD".to_string(),
            message: e.to_string(),
        })?;
    }

    // Step 8: Metadata
    let exported = if is_pr || !target.is_none() {
        metadata::export(git, sink)?
    } else {
        info!("Nothing was checked out, skipping metadata export");
        Vec::new()
    };

    Ok(CheckoutReport {
        target,
        pull_request: is_pr,
        strategy,
        exported,
    })
}
