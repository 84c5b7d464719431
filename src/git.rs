use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::error::Error;
use crate::remote_url::mask_credentials;
use log::debug;

/// Spawn `git` with `args` inside `dir` and return its raw output.
///
/// This uses the system git command, so SSH keys, credential helpers and
/// anything configured in ~/.gitconfig apply. Interactive prompts are
/// disabled; a job that needs credentials it was not given fails instead of
/// hanging.
pub fn output(dir: &Path, args: &[&str]) -> Result<Output, Error> {
    let printable = printable_args(args);
    debug!("git {} (in {})", printable, dir.display());

    Command::new("git")
        .current_dir(dir)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Error::GitCommand {
            command: printable,
            dir: dir.display().to_string(),
            stderr: e.to_string(),
        })
}

/// Run `git` with `args` inside `dir`, failing on a non-zero exit.
///
/// Returns stdout with trailing whitespace removed.
pub fn run(dir: &Path, args: &[&str]) -> Result<String, Error> {
    let output = output(dir, args)?;

    if !output.status.success() {
        return Err(command_error(dir, args, &output));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

/// Build the error for a git invocation that exited unsuccessfully.
pub fn command_error(dir: &Path, args: &[&str], output: &Output) -> Error {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    // Merge conflicts are reported on stdout, everything else on stderr
    let message = if stderr.trim().is_empty() {
        stdout.trim().to_string()
    } else {
        stderr.trim().to_string()
    };

    Error::GitCommand {
        command: printable_args(args),
        dir: dir.display().to_string(),
        stderr: message,
    }
}

/// Whether the repository in `dir` only holds part of its history.
///
/// Asks git rather than looking for `.git/shallow`, since `.git` may be a
/// gitfile pointing elsewhere (worktrees, submodules, `--separate-git-dir`).
pub fn is_shallow(dir: &Path) -> Result<bool, Error> {
    let answer = run(dir, &["rev-parse", "--is-shallow-repository"])?;
    Ok(answer.trim() == "true")
}

fn printable_args(args: &[&str]) -> String {
    args.iter()
        .map(|arg| mask_credentials(arg))
        .collect::<Vec<_>>()
        .join(" ")
}
