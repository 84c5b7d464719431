//! # CI Git Clone CLI
//!
//! This is the binary entry point for the `ci-git-clone` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments and step inputs using `clap`.
//! - Running the checkout described by them.
//! - Translating the outcome into the final marker line and exit code.
//!
//! The checkout logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    cli.execute()
}
