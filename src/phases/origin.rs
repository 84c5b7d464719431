//! Origin state inspection and repository reset.
//!
//! A clone directory may be a fresh empty directory or a checkout restored
//! from a build cache. Inspecting it decides whether `origin` has to be added
//! and whether a reset request means anything.

use crate::error::{Error, Result};
use crate::repository::GitOperations;
use log::info;

/// Whether the clone directory already has a remote named `origin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginState {
    pub present: bool,
    pub url: Option<String>,
}

impl OriginState {
    /// Looks at the clone directory without modifying it.
    pub fn inspect(git: &dyn GitOperations) -> Result<Self> {
        if !git.has_git_dir() {
            return Ok(Self {
                present: false,
                url: None,
            });
        }

        let url = git.remote_url("origin").map_err(Error::remote_setup)?;
        Ok(Self {
            present: url.is_some(),
            url,
        })
    }

    /// Whether `origin` points at `expected`, ignoring a trailing slash.
    pub fn matches(&self, expected: &str) -> bool {
        self.url
            .as_deref()
            .is_some_and(|url| url.trim_end_matches('/') == expected.trim_end_matches('/'))
    }
}

/// Discards local changes and untracked files, in the superproject and
/// every submodule.
pub fn reset(git: &dyn GitOperations) -> Result<()> {
    info!("Resetting repository");

    git.reset_hard().map_err(Error::remote_setup)?;
    git.clean().map_err(Error::remote_setup)?;
    git.submodule_foreach("git reset --hard HEAD")
        .map_err(Error::remote_setup)?;
    git.submodule_foreach("git clean -x -d -f")
        .map_err(Error::remote_setup)?;
    Ok(())
}
