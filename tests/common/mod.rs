//! Shared test utilities for E2E tests.
//!
//! Every test gets its own temporary directory holding a working repository
//! (`work`), a bare repository it pushes to (`remote.git`, reached through a
//! `file://` URL so shallow fetches behave like a real server), and the
//! directory the binary clones into.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = GitFixture::new();
//!     fixture.commit("README.md", "hello", "Initial commit");
//!     fixture.command().env("branch", "main").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::GitFixture;
}

/// Step inputs the binary reads from the environment. They are removed from
/// every command so the outer environment cannot leak into a test.
const STEP_INPUTS: [&str; 17] = [
    "repository_url",
    "clone_into_dir",
    "commit",
    "tag",
    "branch",
    "branch_dest",
    "pull_request_id",
    "pull_request_repository_url",
    "pull_request_merge_branch",
    "pull_request_repository_private",
    "reset_repository",
    "clone_depth",
    "manual_merge",
    "update_submodules",
    "git_http_ssl_verify",
    "git_http_username",
    "git_http_password",
];

/// Identity used for commits made by the fixture and merges made by the
/// binary.
const IDENTITY: [(&str, &str); 4] = [
    ("GIT_AUTHOR_NAME", "Test Author"),
    ("GIT_AUTHOR_EMAIL", "author@example.com"),
    ("GIT_COMMITTER_NAME", "Test Committer"),
    ("GIT_COMMITTER_EMAIL", "committer@example.com"),
];

/// Run git in `dir` and return its trimmed stdout, panicking on failure.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["-c", "commit.gpgsign=false", "-c", "tag.gpgsign=false"])
        .args(args)
        .current_dir(dir)
        .envs(IDENTITY)
        .output()
        .expect("Failed to run git");

    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A working repository with a bare remote and an empty clone target.
pub struct GitFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl GitFixture {
    /// Create a fixture whose working repository is on an unborn `main`.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        let fixture = Self { temp_dir };

        let work = fixture.work_dir();
        std::fs::create_dir_all(&work).expect("Failed to create work directory");
        git(&work, &["init", "--quiet"]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let remote = fixture.remote_dir();
        std::fs::create_dir_all(&remote).expect("Failed to create remote directory");
        git(&remote, &["init", "--quiet", "--bare"]);
        git(
            &work,
            &["remote", "add", "origin", remote.to_str().expect("utf-8 path")],
        );

        fixture
    }

    /// Write a file, commit it on the current branch, push, and return the
    /// new commit hash.
    pub fn commit(&self, file: &str, content: &str, message: &str) -> String {
        self.temp_dir
            .child("work")
            .child(file)
            .write_str(content)
            .expect("Failed to write file");
        git(&self.work_dir(), &["add", "--all"]);
        git(&self.work_dir(), &["commit", "--quiet", "-m", message]);
        self.push();
        self.head()
    }

    /// Create a branch at the current commit and switch to it.
    pub fn branch(&self, name: &str) {
        git(&self.work_dir(), &["checkout", "--quiet", "-b", name]);
    }

    /// Switch the working repository to an existing branch.
    pub fn switch(&self, name: &str) {
        git(&self.work_dir(), &["checkout", "--quiet", name]);
    }

    /// Tag the current commit and push the tag.
    pub fn tag(&self, name: &str) {
        git(&self.work_dir(), &["tag", name]);
        self.push();
    }

    /// Merge `branch` into the current branch with a merge commit, push,
    /// and return the merge commit hash.
    pub fn merge(&self, branch: &str, message: &str) -> String {
        git(
            &self.work_dir(),
            &["merge", "--quiet", "--no-ff", "-m", message, branch],
        );
        self.push();
        self.head()
    }

    /// Push `local` to an arbitrary ref of the remote, such as the
    /// `refs/pull/<id>/merge` refs hosting providers publish.
    pub fn push_ref(&self, local: &str, remote_ref: &str) {
        let refspec = format!("{}:{}", local, remote_ref);
        git(&self.work_dir(), &["push", "--quiet", "origin", &refspec]);
    }

    /// Push `local` to `remote_ref` of a fork owned by a different
    /// namespace, creating the fork on first use.
    pub fn push_to_fork(&self, local: &str, remote_ref: &str) {
        let fork = self.fork_dir();
        if !fork.exists() {
            std::fs::create_dir_all(&fork).expect("Failed to create fork directory");
            git(&fork, &["init", "--quiet", "--bare"]);
        }
        let refspec = format!("{}:{}", local, remote_ref);
        git(
            &self.work_dir(),
            &["push", "--quiet", fork.to_str().expect("utf-8 path"), &refspec],
        );
    }

    pub fn fork_dir(&self) -> PathBuf {
        self.temp_dir.path().join("someone").join("fork.git")
    }

    /// `file://` URL of the fork.
    pub fn fork_url(&self) -> String {
        format!("file://{}", self.fork_dir().display())
    }

    /// Hash of the working repository's HEAD.
    pub fn head(&self) -> String {
        git(&self.work_dir(), &["rev-parse", "HEAD"])
    }

    fn push(&self) {
        git(&self.work_dir(), &["push", "--quiet", "origin", "--all"]);
        git(&self.work_dir(), &["push", "--quiet", "origin", "--tags"]);
    }

    pub fn work_dir(&self) -> PathBuf {
        self.temp_dir.path().join("work")
    }

    pub fn remote_dir(&self) -> PathBuf {
        self.temp_dir.path().join("remote.git")
    }

    /// `file://` URL of the bare remote.
    pub fn remote_url(&self) -> String {
        format!("file://{}", self.remote_dir().display())
    }

    /// Directory the binary clones into.
    pub fn clone_dir(&self) -> PathBuf {
        self.temp_dir.path().join("clone")
    }

    pub fn export_file(&self) -> PathBuf {
        self.temp_dir.path().join("export.env")
    }

    /// Values the last run exported, in export order.
    pub fn exported(&self) -> Vec<(String, String)> {
        ci_git_clone::export::read_export_file(&self.export_file())
            .expect("Failed to read export file")
    }

    /// Exported value for `key`.
    pub fn exported_value(&self, key: &str) -> Option<String> {
        self.exported()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Create a command cloning this fixture's remote into `clone_dir`,
    /// exporting to `export_file`, without submodules or colors.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ci-git-clone");
        for name in STEP_INPUTS {
            cmd.env_remove(name);
        }
        cmd.current_dir(self.temp_dir.path())
            .envs(IDENTITY)
            .env("repository_url", self.remote_url())
            .env("clone_into_dir", self.clone_dir())
            .env("update_submodules", "no")
            .env("GIT_CLONE_EXPORT_FILE", self.export_file())
            .env_remove("GIT_CLONE_REPORT_FILE")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for GitFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_commits_reach_remote() {
        let fixture = GitFixture::new();
        let sha = fixture.commit("a.txt", "a", "First");

        let remote_head = git(&fixture.remote_dir(), &["rev-parse", "refs/heads/main"]);
        assert_eq!(remote_head, sha);
    }

    #[test]
    fn test_fixture_starts_with_empty_clone_dir() {
        let fixture = GitFixture::new();
        assert!(!fixture.clone_dir().exists());
    }
}
