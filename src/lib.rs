//! # CI Git Clone Library
//!
//! This library brings a CI working directory to a precisely specified
//! version-control state: a branch, tag or commit, or the result of merging a
//! pull request, optionally shallow and optionally with submodules. Afterwards
//! it exports HEAD's commit metadata for later build steps.
//!
//! It does not implement git. It decides which git operations to run and in
//! what order, and delegates every one of them to an executor.
//!
//! ## Quick Example
//!
//! ```no_run
//! use ci_git_clone::config::CheckoutRequest;
//! use ci_git_clone::export::MemorySink;
//! use ci_git_clone::phases::orchestrator::execute_checkout;
//! use ci_git_clone::repository::DefaultGitOperations;
//!
//! let request = CheckoutRequest {
//!     repository_url: "https://github.com/org/repo.git".to_string(),
//!     clone_dir: "./src".into(),
//!     branch: "main".to_string(),
//!     clone_depth: 1,
//!     ..Default::default()
//! };
//!
//! let git = DefaultGitOperations::new(&request.clone_dir);
//! let mut sink = MemorySink::new();
//! let report = execute_checkout(&request, &git, &mut sink).unwrap();
//! assert_eq!(report.exported.len(), 8);
//! ```
//!
//! ## Core Concepts
//!
//! - **Request (`config`)**: The immutable `CheckoutRequest` describing the
//!   wanted state.
//! - **Ref resolution (`refs`)**: Commit, tag and branch inputs collapse into
//!   one `CheckoutTarget` by precedence.
//! - **Executor (`repository`, `git`)**: The `GitOperations` trait, one method
//!   per git operation, and its system-git implementation.
//! - **Phases (`phases`)**: Origin inspection, shallow checkout, pull request
//!   merge, submodule update and metadata export, sequenced by the
//!   orchestrator.
//! - **Export (`export`)**: Where exported metadata goes.
//!
//! ## Execution Flow
//!
//! 1.  **Origin**: Detect an existing `origin`; reset the checkout if asked.
//! 2.  **Setup**: `git init`, add `origin`, optionally disable TLS verification.
//! 3.  **Checkout**: Shallow fetch and checkout of the resolved target, or a
//!     pull request auto-merge / manual merge.
//! 4.  **Submodules**: Recursive update when enabled.
//! 5.  **Detach**: Pull request builds always end on a detached HEAD.
//! 6.  **Export**: Commit hash, message, author, committer and commit count.

pub mod config;
pub mod error;
pub mod export;
pub mod git;
pub mod output;
pub mod phases;
pub mod refs;
pub mod remote_url;
pub mod repository;

#[cfg(test)]
mod test_support;
