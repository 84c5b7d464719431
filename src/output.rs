//! # Output Configuration
//!
//! This module provides everything the CLI prints besides log lines: the
//! configuration summary at the start of a run and the success or error
//! marker at its end.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! Secrets never reach the output: the HTTP token is masked and any password
//! embedded in a URL is replaced before printing.

use crate::config::CheckoutRequest;
use crate::error::Error;
use crate::remote_url::mask_credentials;
use console::Style;
use std::env;
use std::io::{self, Write};

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.use_color {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Writes every request field, one per line, with secrets masked.
pub fn write_summary(
    out: &mut dyn Write,
    config: &OutputConfig,
    request: &CheckoutRequest,
) -> io::Result<()> {
    let flag = |value: bool| if value { "yes" } else { "no" };
    let token = if request.http_token.is_empty() {
        ""
    } else {
        "***"
    };
    let private = match request.pr_repository_private {
        Some(value) => flag(value),
        None => "",
    };
    let pr_id = request.pr_id.map(|id| id.to_string()).unwrap_or_default();
    let clone_dir = request.clone_dir.display().to_string();
    let clone_depth = request.clone_depth.to_string();
    let repository_url = mask_credentials(&request.repository_url);
    let pr_repository_url = mask_credentials(&request.pr_repository_url);

    let rows: [(&str, &str); 17] = [
        ("repository_url", &repository_url),
        ("clone_into_dir", &clone_dir),
        ("commit", &request.commit),
        ("tag", &request.tag),
        ("branch", &request.branch),
        ("branch_dest", &request.branch_dest),
        ("pull_request_id", &pr_id),
        ("pull_request_repository_url", &pr_repository_url),
        ("pull_request_merge_branch", &request.pr_merge_branch),
        ("pull_request_repository_private", private),
        ("reset_repository", flag(request.reset_repository)),
        ("clone_depth", &clone_depth),
        ("manual_merge", flag(request.manual_merge)),
        ("update_submodules", flag(request.update_submodules)),
        ("git_http_ssl_verify", flag(request.ssl_verify)),
        ("git_http_username", &request.http_user),
        ("git_http_password", token),
    ];

    writeln!(out, "{}", config.paint(Style::new().bold(), "Configs:"))?;
    for (name, value) in rows {
        writeln!(out, "- {}: {}", name, value)?;
    }
    writeln!(out)
}

/// Final line of a successful run.
pub fn success_marker(config: &OutputConfig) -> String {
    config.paint(Style::new().green().bold(), "Success")
}

/// Final line of a failed run, naming the stage that failed.
pub fn error_marker(config: &OutputConfig, err: &Error) -> String {
    let label = format!("ERROR [{}]:", err.stage());
    format!("{} {}", config.paint(Style::new().red().bold(), &label), err)
}
