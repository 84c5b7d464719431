//! Recording mock of `GitOperations` shared by the phase tests.

use crate::error::{Error, Result};
use crate::repository::{FetchRequest, GitOperations};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One call made against the mock, in the order it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Init,
    RemoteAdd { name: String, url: String },
    ConfigSet { key: String, value: String },
    Fetch(FetchRequest),
    Checkout { r#ref: String, detach: bool },
    Merge(String),
    ResetHard,
    Clean,
    SubmoduleForeach(String),
    SubmoduleUpdate,
    Log(String),
    RevListCount(String),
}

impl GitCall {
    pub fn fetch(remote: &str, refspec: Option<&str>, depth: u32) -> Self {
        GitCall::Fetch(FetchRequest::new(remote, refspec, depth))
    }

    pub fn checkout(r#ref: &str, detach: bool) -> Self {
        GitCall::Checkout {
            r#ref: r#ref.to_string(),
            detach,
        }
    }

    pub fn merge(r#ref: &str) -> Self {
        GitCall::Merge(r#ref.to_string())
    }

    pub fn remote_add(name: &str, url: &str) -> Self {
        GitCall::RemoteAdd {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    fn is_read(&self) -> bool {
        matches!(self, GitCall::Log(_) | GitCall::RevListCount(_))
    }
}

/// Mock git operations for testing
pub struct MockGitOperations {
    calls: Arc<Mutex<Vec<GitCall>>>,
    remotes: Mutex<HashMap<String, String>>,
    has_git_dir: bool,
    /// Calls that fail, with how many more times they should fail.
    failures: Mutex<Vec<(GitCall, usize)>>,
    log_output: HashMap<String, String>,
    commit_count: u64,
}

impl MockGitOperations {
    /// An empty directory: no repository, no remotes.
    pub fn new() -> Self {
        let log_output = [
            ("%H", "3f786850e387550fdab836ed7e6dc881de23001b"),
            ("%s", "Add checkout step"),
            ("%b", "Longer description\nspanning lines"),
            ("%an", "Ada Author"),
            ("%ae", "ada@example.com"),
            ("%cn", "Carl Committer"),
            ("%ce", "carl@example.com"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            remotes: Mutex::new(HashMap::new()),
            has_git_dir: false,
            failures: Mutex::new(Vec::new()),
            log_output,
            commit_count: 12,
        }
    }

    /// An existing checkout whose `origin` points at `url`.
    pub fn with_origin(url: &str) -> Self {
        let mock = Self::new();
        mock.remotes
            .lock()
            .unwrap()
            .insert("origin".to_string(), url.to_string());
        Self {
            has_git_dir: true,
            ..mock
        }
    }

    /// Make `call` fail the next `times` times it is issued.
    pub fn fail_on(self, call: GitCall, times: usize) -> Self {
        self.failures.lock().unwrap().push((call, times));
        self
    }

    /// Every call, including metadata reads.
    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change the repository, i.e. without `log`/`rev-list`.
    pub fn mutations(&self) -> Vec<GitCall> {
        self.calls()
            .into_iter()
            .filter(|call| !call.is_read())
            .collect()
    }

    fn record(&self, call: GitCall) -> Result<()> {
        self.calls.lock().unwrap().push(call.clone());

        let mut failures = self.failures.lock().unwrap();
        if let Some((_, remaining)) = failures
            .iter_mut()
            .find(|(failing, remaining)| *failing == call && *remaining > 0)
        {
            *remaining -= 1;
            return Err(Error::GitCommand {
                command: format!("{:?}", call),
                dir: "/mock".to_string(),
                stderr: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

impl GitOperations for MockGitOperations {
    fn has_git_dir(&self) -> bool {
        self.has_git_dir
    }

    fn remote_url(&self, name: &str) -> Result<Option<String>> {
        Ok(self.remotes.lock().unwrap().get(name).cloned())
    }

    fn init(&self) -> Result<()> {
        self.record(GitCall::Init)
    }

    fn remote_add(&self, name: &str, url: &str) -> Result<()> {
        self.record(GitCall::remote_add(name, url))?;
        self.remotes
            .lock()
            .unwrap()
            .insert(name.to_string(), url.to_string());
        Ok(())
    }

    fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.record(GitCall::ConfigSet {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn fetch(&self, request: &FetchRequest) -> Result<()> {
        self.record(GitCall::Fetch(request.clone()))
    }

    fn checkout(&self, r#ref: &str, detach: bool) -> Result<()> {
        self.record(GitCall::checkout(r#ref, detach))
    }

    fn merge(&self, r#ref: &str) -> Result<()> {
        self.record(GitCall::merge(r#ref))
    }

    fn reset_hard(&self) -> Result<()> {
        self.record(GitCall::ResetHard)
    }

    fn clean(&self) -> Result<()> {
        self.record(GitCall::Clean)
    }

    fn submodule_foreach(&self, command: &str) -> Result<()> {
        self.record(GitCall::SubmoduleForeach(command.to_string()))
    }

    fn submodule_update(&self) -> Result<()> {
        self.record(GitCall::SubmoduleUpdate)
    }

    fn log(&self, format: &str) -> Result<String> {
        self.record(GitCall::Log(format.to_string()))?;
        Ok(self.log_output.get(format).cloned().unwrap_or_default())
    }

    fn rev_list_count(&self, r#ref: &str) -> Result<u64> {
        self.record(GitCall::RevListCount(r#ref.to_string()))?;
        Ok(self.commit_count)
    }
}
