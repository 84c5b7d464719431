//! Submodule update, run once after the primary checkout or merge.

use crate::error::{Error, Result};
use crate::repository::GitOperations;
use log::info;

/// Recursively initialises and updates every submodule.
pub fn update(git: &dyn GitOperations) -> Result<()> {
    info!("Updating submodules");
    git.submodule_update()
        .map_err(|e| Error::SubmoduleUpdateFailed {
            message: e.to_string(),
        })
}
