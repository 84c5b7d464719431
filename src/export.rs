//! Export sinks for commit metadata.
//!
//! After the checkout, each metadata field is handed to an `ExportSink` as a
//! single `(key, value)` pair so later CI steps can read it. Sinks do not
//! buffer: a pair is delivered (or fails) before the next one is produced.

use crate::error::{Error, Result};
use log::debug;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Receiver of exported key/value pairs.
pub trait ExportSink {
    fn export(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Exports through `envman add`, the environment store used by
/// Bitrise-style step runners.
#[derive(Debug, Clone)]
pub struct EnvmanSink {
    program: String,
}

impl EnvmanSink {
    pub fn new() -> Self {
        Self {
            program: "envman".to_string(),
        }
    }

    /// Use a different executable, e.g. an absolute path to envman.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for EnvmanSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportSink for EnvmanSink {
    fn export(&mut self, key: &str, value: &str) -> Result<()> {
        debug!("{} add --key {}", self.program, key);

        let output = Command::new(&self.program)
            .args(["add", "--key", key, "--value", value])
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(Error::Io(io::Error::other(format!(
                "{} add --key {} exited with {}: {}",
                self.program,
                key,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))));
        }
        Ok(())
    }
}

/// Appends pairs to a file using heredoc-style blocks, so multi-line values
/// such as commit bodies survive:
///
/// ```text
/// KEY<<EOF
/// value
/// EOF
/// ```
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExportSink for FileSink {
    fn export(&mut self, key: &str, value: &str) -> Result<()> {
        let delimiter = delimiter_for(value);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}<<{}", key, delimiter)?;
        writeln!(file, "{}", value)?;
        writeln!(file, "{}", delimiter)?;
        Ok(())
    }
}

/// Keeps exported pairs in memory, in export order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    fields: Vec<(String, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl ExportSink for MemorySink {
    fn export(&mut self, key: &str, value: &str) -> Result<()> {
        self.fields.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

/// Picks a heredoc delimiter that does not occur as a line of `value`.
fn delimiter_for(value: &str) -> String {
    let mut delimiter = "EOF".to_string();
    while value.lines().any(|line| line == delimiter) {
        delimiter.push('_');
    }
    delimiter
}

/// Parses a file written by `FileSink` back into pairs.
pub fn read_export_file(path: &Path) -> Result<Vec<(String, String)>> {
    let content = std::fs::read_to_string(path)?;
    let mut fields = Vec::new();
    let mut lines = content.lines();

    while let Some(header) = lines.next() {
        let Some((key, delimiter)) = header.split_once("<<") else {
            continue;
        };
        let mut value = Vec::new();
        for line in lines.by_ref() {
            if line == delimiter {
                break;
            }
            value.push(line);
        }
        fields.push((key.to_string(), value.join("\n")));
    }

    Ok(fields)
}
