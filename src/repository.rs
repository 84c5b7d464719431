//! # Version-Control Executor
//!
//! This module defines `GitOperations`, the typed interface through which the
//! checkout phases drive git, and `DefaultGitOperations`, its implementation
//! on top of the system `git` binary.
//!
//! ## Design
//!
//! Every logical operation the decision engine needs is one trait method.
//! Phases never build command lines themselves; they describe *what* to do
//! (fetch this ref at this depth, check that out detached) and the executor
//! decides *how*. This keeps the decision logic independent of invocation
//! syntax and lets tests substitute a recording mock that scripts failures
//! for individual calls.
//!
//! All calls are blocking and are issued strictly one after another against
//! a single working directory.

use crate::error::{Error, Result};
use crate::git;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Parameters of a single `git fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Remote to fetch from.
    pub remote: String,
    /// Ref to fetch; `None` fetches the remote's default refspecs.
    pub refspec: Option<String>,
    /// History depth; `0` means complete history.
    pub depth: u32,
}

impl FetchRequest {
    pub fn new(remote: &str, refspec: Option<&str>, depth: u32) -> Self {
        Self {
            remote: remote.to_string(),
            refspec: refspec.map(str::to_string),
            depth,
        }
    }

    /// The same fetch with complete history.
    pub fn full_history(&self) -> Self {
        Self {
            depth: 0,
            ..self.clone()
        }
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.remote)?;
        if let Some(refspec) = &self.refspec {
            write!(f, " {}", refspec)?;
        }
        if self.depth > 0 {
            write!(f, " (depth {})", self.depth)?;
        }
        Ok(())
    }
}

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Whether the clone directory already contains a repository.
    fn has_git_dir(&self) -> bool;

    /// URL configured for remote `name`, or `None` when there is no such
    /// remote. Never modifies the repository.
    fn remote_url(&self, name: &str) -> Result<Option<String>>;

    /// Creates the clone directory if needed and initialises a repository.
    fn init(&self) -> Result<()>;

    fn remote_add(&self, name: &str, url: &str) -> Result<()>;

    fn config_set(&self, key: &str, value: &str) -> Result<()>;

    /// Fetches according to `request`. A depth of `0` on a shallow
    /// repository completes its history.
    fn fetch(&self, request: &FetchRequest) -> Result<()>;

    /// Checks out `r#ref`. With `detach`, HEAD is left pointing at the
    /// commit rather than a branch; an empty ref detaches at the current
    /// HEAD.
    fn checkout(&self, r#ref: &str, detach: bool) -> Result<()>;

    fn merge(&self, r#ref: &str) -> Result<()>;

    /// Discards tracked changes in the working tree.
    fn reset_hard(&self) -> Result<()>;

    /// Removes untracked and ignored files.
    fn clean(&self) -> Result<()>;

    /// Runs a shell command inside every submodule.
    fn submodule_foreach(&self, command: &str) -> Result<()>;

    /// Recursively initialises and updates all submodules.
    fn submodule_update(&self) -> Result<()>;

    /// Formats HEAD with a `git log` pretty format.
    fn log(&self, format: &str) -> Result<String>;

    /// Number of commits reachable from `r#ref`.
    fn rev_list_count(&self, r#ref: &str) -> Result<u64>;
}

/// The default implementation of `GitOperations`, which runs the system
/// `git` command inside the clone directory.
pub struct DefaultGitOperations {
    dir: PathBuf,
}

impl DefaultGitOperations {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        git::run(&self.dir, args)
    }
}

impl GitOperations for DefaultGitOperations {
    fn has_git_dir(&self) -> bool {
        self.dir.join(".git").exists()
    }

    fn remote_url(&self, name: &str) -> Result<Option<String>> {
        let key = format!("remote.{}.url", name);
        let args = ["config", "--get", key.as_str()];
        let output = git::output(&self.dir, &args)?;

        // `git config --get` exits with 1 when the key is not set
        match output.status.code() {
            Some(0) => Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            )),
            Some(1) => Ok(None),
            _ => Err(git::command_error(&self.dir, &args, &output)),
        }
    }

    fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        self.run(&["init", "--quiet"]).map(drop)
    }

    fn remote_add(&self, name: &str, url: &str) -> Result<()> {
        self.run(&["remote", "add", name, url]).map(drop)
    }

    fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.run(&["config", key, value]).map(drop)
    }

    fn fetch(&self, request: &FetchRequest) -> Result<()> {
        let depth_arg = format!("--depth={}", request.depth);

        let mut args = vec!["fetch"];
        if request.depth > 0 {
            args.push(&depth_arg);
        } else if git::is_shallow(&self.dir)? {
            args.push("--unshallow");
        }
        args.push(&request.remote);
        if let Some(refspec) = &request.refspec {
            args.push(refspec);
        }

        self.run(&args).map(drop)
    }

    fn checkout(&self, r#ref: &str, detach: bool) -> Result<()> {
        let mut args = vec!["checkout", "--quiet"];
        if detach {
            args.push("--detach");
        }
        if !r#ref.is_empty() {
            args.push(r#ref);
        }
        self.run(&args).map(drop)
    }

    fn merge(&self, r#ref: &str) -> Result<()> {
        self.run(&["merge", "--no-edit", r#ref]).map(drop)
    }

    fn reset_hard(&self) -> Result<()> {
        self.run(&["reset", "--hard", "HEAD"]).map(drop)
    }

    fn clean(&self) -> Result<()> {
        self.run(&["clean", "-x", "-d", "-f"]).map(drop)
    }

    fn submodule_foreach(&self, command: &str) -> Result<()> {
        self.run(&["submodule", "foreach", "--recursive", command])
            .map(drop)
    }

    fn submodule_update(&self) -> Result<()> {
        self.run(&["submodule", "update", "--init", "--recursive"])
            .map(drop)
    }

    fn log(&self, format: &str) -> Result<String> {
        let pretty = format!("--format={}", format);
        self.run(&["log", "-1", &pretty])
    }

    fn rev_list_count(&self, r#ref: &str) -> Result<u64> {
        let args = ["rev-list", "--count", r#ref];
        let count = self.run(&args)?;
        count.trim().parse().map_err(|_| Error::GitCommand {
            command: args.join(" "),
            dir: self.dir.display().to_string(),
            stderr: format!("unexpected commit count output '{}'", count),
        })
    }
}
