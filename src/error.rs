//! # Error Handling
//!
//! This module defines the centralized error type for `ci-git-clone`. It uses
//! `thiserror` to derive a single `Error` enum whose variants map one-to-one to
//! the stages of a checkout run, so a failure can always be reported together
//! with the stage that produced it.
//!
//! ## Key Components
//!
//! - **`Error`**: Every failure the library can surface. Stage variants carry
//!   enough context (ref, remote, underlying git output) to act on the report
//!   without re-running the job with verbose logging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Raw executor failures are reported as `GitCommand` and are wrapped into a
//! stage variant by the phase that issued the command. The only failure that
//! is ever recovered from is a shallow fetch, which is retried once with full
//! history before `FetchFailed` is raised.

use thiserror::Error;

/// Main error type for ci-git-clone operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required input is missing or malformed.
    #[error("Invalid configuration: {message}")]
    ConfigInvalid { message: String },

    /// `git init`, `git remote add`, `git config` or a repository reset failed.
    #[error("Remote setup failed: {message}")]
    RemoteSetupFailed { message: String },

    /// A fetch failed, including the full-history retry when one applied.
    #[error("Fetch failed for {remote} {refspec}: {message}")]
    FetchFailed {
        remote: String,
        refspec: String,
        message: String,
    },

    /// The requested ref could not be checked out after fetching.
    #[error("Checkout failed for {r#ref}: {message}")]
    CheckoutFailed { r#ref: String, message: String },

    /// A local merge did not complete cleanly.
    #[error("Merge of {r#ref} failed: {message}")]
    MergeConflict { r#ref: String, message: String },

    /// The provider-computed pull request merge ref could not be resolved.
    #[error("Pull request merge ref {r#ref} could not be resolved: {message}")]
    MergeRefUnresolvable { r#ref: String, message: String },

    /// `git submodule update` failed.
    #[error("Submodule update failed: {message}")]
    SubmoduleUpdateFailed { message: String },

    /// Reading or exporting a metadata field failed.
    #[error("Failed to export {key}: {message}")]
    MetadataExportFailed { key: String, message: String },

    /// A git command exited unsuccessfully or could not be spawned.
    #[error("Git command failed in {dir}: git {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Short name of the stage that failed, used in the error marker.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::ConfigInvalid { .. } => "config",
            Error::RemoteSetupFailed { .. } => "remote setup",
            Error::FetchFailed { .. } => "fetch",
            Error::CheckoutFailed { .. } => "checkout",
            Error::MergeConflict { .. } | Error::MergeRefUnresolvable { .. } => "merge",
            Error::SubmoduleUpdateFailed { .. } => "submodules",
            Error::MetadataExportFailed { .. } => "export",
            Error::GitCommand { .. } => "git",
            Error::Io(_) => "io",
            Error::UrlParse(_) => "url",
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::ConfigInvalid {
            message: message.into(),
        }
    }

    pub(crate) fn remote_setup(err: Error) -> Self {
        Error::RemoteSetupFailed {
            message: err.to_string(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
