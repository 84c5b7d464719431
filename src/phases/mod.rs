//! The phases of a checkout run.
//!
//! ## Overview
//!
//! A run moves through these phases, each in its own module:
//! 1. Origin - Inspect the clone directory and reset it if requested
//! 2. Shallow checkout - Fetch and check out a branch, tag or commit
//! 3. Pull request - Auto-merge or manually merge a pull request
//! 4. Submodules - Recursively update submodules
//! 5. Metadata - Export HEAD's commit metadata
//!
//! Phases 2 and 3 are alternatives: a pull request request never goes
//! through plain ref checkout. The `orchestrator` module sequences the phases
//! and is the entry point for callers.
//!
//! Every phase talks to git only through `GitOperations` and converts
//! executor failures into the stage error it owns.

pub mod metadata;
pub mod orchestrator;
pub mod origin;
pub mod pull_request;
pub mod shallow;
pub mod submodules;
