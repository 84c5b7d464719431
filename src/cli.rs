//! CLI argument parsing and run wiring
//!
//! Every argument can also come from the environment, which is how CI step
//! inputs arrive. Empty values count as "not provided".

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use ci_git_clone::config::{parse_flag, CheckoutRequest};
use ci_git_clone::error::Error;
use ci_git_clone::export::{EnvmanSink, ExportSink, FileSink};
use ci_git_clone::output::{error_marker, success_marker, write_summary, OutputConfig};
use ci_git_clone::phases::orchestrator::{execute_checkout, CheckoutReport};
use ci_git_clone::remote_url::{mask_credentials, with_http_credentials};
use ci_git_clone::repository::DefaultGitOperations;

/// CI Git Clone - Bring a CI working directory to a requested git state
#[derive(Parser, Debug)]
#[command(name = "ci-git-clone")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Repository to clone; becomes remote `origin`
    #[arg(long, env = "repository_url", value_name = "URL")]
    repository_url: Option<String>,

    /// Directory to clone into
    #[arg(long = "clone-into-dir", env = "clone_into_dir", value_name = "DIR")]
    clone_dir: Option<String>,

    /// Commit to check out (wins over tag and branch)
    #[arg(long, env = "commit", value_name = "SHA")]
    commit: Option<String>,

    /// Tag to check out (wins over branch)
    #[arg(long, env = "tag")]
    tag: Option<String>,

    /// Branch to check out, or the pull request source branch
    #[arg(long, env = "branch")]
    branch: Option<String>,

    /// Pull request destination branch
    #[arg(long, env = "branch_dest", value_name = "BRANCH")]
    branch_dest: Option<String>,

    /// Pull request number
    #[arg(long = "pull-request-id", env = "pull_request_id", value_name = "ID")]
    pr_id: Option<String>,

    /// Repository the pull request comes from
    #[arg(
        long = "pull-request-repository-url",
        env = "pull_request_repository_url",
        value_name = "URL"
    )]
    pr_repository_url: Option<String>,

    /// Provider merge ref, e.g. pull/42/merge
    #[arg(
        long = "pull-request-merge-branch",
        env = "pull_request_merge_branch",
        value_name = "REF"
    )]
    pr_merge_branch: Option<String>,

    /// Whether the pull request source repository is private (yes, no)
    #[arg(
        long = "pull-request-repository-private",
        env = "pull_request_repository_private",
        value_name = "YES|NO"
    )]
    pr_repository_private: Option<String>,

    /// Hard reset and clean an existing checkout (yes, no)
    #[arg(long, env = "reset_repository", value_name = "YES|NO")]
    reset_repository: Option<String>,

    /// Fetch depth; 0 fetches the full history
    #[arg(long, env = "clone_depth", value_name = "N")]
    clone_depth: Option<String>,

    /// Merge pull requests locally instead of using the merge ref (yes, no)
    #[arg(long, env = "manual_merge", value_name = "YES|NO")]
    manual_merge: Option<String>,

    /// Update submodules after checkout (yes, no)
    #[arg(long, env = "update_submodules", value_name = "YES|NO")]
    update_submodules: Option<String>,

    /// Verify TLS certificates of HTTP remotes (yes, no)
    #[arg(
        long = "git-http-ssl-verify",
        env = "git_http_ssl_verify",
        value_name = "YES|NO"
    )]
    ssl_verify: Option<String>,

    /// Basic-auth user for HTTP remotes
    #[arg(long = "git-http-username", env = "git_http_username", value_name = "USER")]
    http_user: Option<String>,

    /// Basic-auth password or token for HTTP remotes
    #[arg(
        long = "git-http-password",
        env = "git_http_password",
        value_name = "TOKEN",
        hide_env_values = true
    )]
    http_token: Option<String>,

    /// Write exported metadata to this file instead of calling envman
    #[arg(long, env = "GIT_CLONE_EXPORT_FILE", value_name = "PATH")]
    export_file: Option<String>,

    /// Write a JSON report of the run to this file
    #[arg(long, env = "GIT_CLONE_REPORT_FILE", value_name = "PATH")]
    report_file: Option<String>,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        env = "GIT_CLONE_LOG_LEVEL",
        value_name = "LEVEL",
        default_value = "info"
    )]
    log_level: String,
}

/// `None` and blank values both mean "not provided".
fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn text(value: &Option<String>) -> String {
    provided(value).unwrap_or_default().to_string()
}

fn flag(name: &str, value: &Option<String>) -> std::result::Result<Option<bool>, Error> {
    provided(value)
        .map(|v| {
            parse_flag(v).map_err(|e| Error::ConfigInvalid {
                message: format!("{}: {}", name, e),
            })
        })
        .transpose()
}

fn number<T: std::str::FromStr>(
    name: &str,
    value: &Option<String>,
) -> std::result::Result<Option<T>, Error> {
    provided(value)
        .map(|v| {
            v.parse::<T>().map_err(|_| Error::ConfigInvalid {
                message: format!("{}: expected a non-negative number, got '{}'", name, v),
            })
        })
        .transpose()
}

impl Cli {
    /// Turn parsed arguments into a checkout request.
    ///
    /// HTTP credentials are embedded into both repository URLs here, so the
    /// library only ever sees ready-to-use remotes.
    pub fn to_request(&self) -> std::result::Result<CheckoutRequest, Error> {
        let http_user = text(&self.http_user);
        let http_token = text(&self.http_token);
        let repository_url =
            with_http_credentials(&text(&self.repository_url), &http_user, &http_token)?;
        let pr_repository_url =
            with_http_credentials(&text(&self.pr_repository_url), &http_user, &http_token)?;

        let defaults = CheckoutRequest::default();
        Ok(CheckoutRequest {
            repository_url,
            clone_dir: PathBuf::from(text(&self.clone_dir)),
            commit: text(&self.commit),
            tag: text(&self.tag),
            branch: text(&self.branch),
            branch_dest: text(&self.branch_dest),
            pr_id: number("pull_request_id", &self.pr_id)?,
            pr_repository_url,
            pr_merge_branch: text(&self.pr_merge_branch),
            pr_repository_private: flag(
                "pull_request_repository_private",
                &self.pr_repository_private,
            )?,
            reset_repository: flag("reset_repository", &self.reset_repository)?
                .unwrap_or(defaults.reset_repository),
            clone_depth: number("clone_depth", &self.clone_depth)?
                .unwrap_or(defaults.clone_depth),
            manual_merge: flag("manual_merge", &self.manual_merge)?
                .unwrap_or(defaults.manual_merge),
            update_submodules: flag("update_submodules", &self.update_submodules)?
                .unwrap_or(defaults.update_submodules),
            ssl_verify: flag("git_http_ssl_verify", &self.ssl_verify)?
                .unwrap_or(defaults.ssl_verify),
            http_user,
            http_token,
        })
    }

    /// Run the checkout and report the outcome on stdout.
    pub fn execute(self) -> ExitCode {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.run(&output) {
            Ok(report) => {
                log::info!(
                    "Checked out {} {} ({} fields exported)",
                    report.target.mode,
                    report.target.r#ref,
                    report.exported.len()
                );
                println!("{}", success_marker(&output));
                ExitCode::SUCCESS
            }
            Err(err) => {
                match err.downcast_ref::<Error>() {
                    Some(checkout_err) => println!("{}", error_marker(&output, checkout_err)),
                    None => println!("ERROR: {:#}", err),
                }
                ExitCode::FAILURE
            }
        }
    }

    fn run(&self, output: &OutputConfig) -> Result<CheckoutReport> {
        let request = self.to_request()?;

        let mut stdout = io::stdout().lock();
        write_summary(&mut stdout, output, &request)?;
        stdout.flush()?;
        drop(stdout);

        request.validate()?;
        log::info!(
            "Cloning {} into {}",
            mask_credentials(&request.repository_url),
            request.clone_dir.display()
        );

        let git = DefaultGitOperations::new(&request.clone_dir);
        let mut sink: Box<dyn ExportSink> = match provided(&self.export_file) {
            Some(path) => Box::new(FileSink::new(path)),
            None => Box::new(EnvmanSink::new()),
        };

        let report = execute_checkout(&request, &git, sink.as_mut())?;

        if let Some(path) = provided(&self.report_file) {
            let json = serde_json::to_string_pretty(&report)?;
            fs::write(path, json).with_context(|| format!("Failed to write report to {}", path))?;
        }

        Ok(report)
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::new()
        .parse_filters(level)
        .format_timestamp(None)
        .init();
}
