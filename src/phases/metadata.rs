//! Commit metadata export.
//!
//! Reads identity and message fields of HEAD plus the reachable commit count
//! and hands each one to an `ExportSink`. The order is fixed so logs of two
//! runs can be compared line by line.

use crate::error::{Error, Result};
use crate::export::ExportSink;
use crate::repository::GitOperations;
use log::{debug, info};
use serde::Serialize;

/// Exported keys and the `git log` format that produces each value.
pub const COMMIT_FIELDS: [(&str, &str); 7] = [
    ("GIT_CLONE_COMMIT_HASH", "%H"),
    ("GIT_CLONE_COMMIT_MESSAGE_SUBJECT", "%s"),
    ("GIT_CLONE_COMMIT_MESSAGE_BODY", "%b"),
    ("GIT_CLONE_COMMIT_AUTHOR_NAME", "%an"),
    ("GIT_CLONE_COMMIT_AUTHOR_EMAIL", "%ae"),
    ("GIT_CLONE_COMMIT_COMMITER_NAME", "%cn"),
    ("GIT_CLONE_COMMIT_COMMITER_EMAIL", "%ce"),
];

/// Key of the reachable commit count, exported last.
pub const COMMIT_COUNT_KEY: &str = "GIT_CLONE_COMMIT_COUNT";

/// A single exported `(name, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedField {
    pub name: String,
    pub value: String,
}

/// Exports HEAD's metadata. The first failure aborts the remaining exports.
pub fn export(git: &dyn GitOperations, sink: &mut dyn ExportSink) -> Result<Vec<ExportedField>> {
    info!("Exporting commit metadata");

    let mut exported = Vec::with_capacity(COMMIT_FIELDS.len() + 1);

    for (key, format) in COMMIT_FIELDS {
        let value = git.log(format).map_err(|e| export_failed(key, e))?;
        exported.push(deliver(sink, key, value)?);
    }

    let count = git
        .rev_list_count("HEAD")
        .map_err(|e| export_failed(COMMIT_COUNT_KEY, e))?;
    exported.push(deliver(sink, COMMIT_COUNT_KEY, count.to_string())?);

    Ok(exported)
}

fn deliver(sink: &mut dyn ExportSink, key: &str, value: String) -> Result<ExportedField> {
    debug!("{}: {}", key, value);
    sink.export(key, &value)
        .map_err(|e| export_failed(key, e))?;
    Ok(ExportedField {
        name: key.to_string(),
        value,
    })
}

fn export_failed(key: &str, err: Error) -> Error {
    Error::MetadataExportFailed {
        key: key.to_string(),
        message: err.to_string(),
    }
}
