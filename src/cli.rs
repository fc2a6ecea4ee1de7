//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `foreman`.
#[derive(Debug, Parser)]
#[command(name = "foreman", version, about = "Coordinate model roles to plan, build, and validate code changes")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process a change request through the plan/build/validate loop.
    Run {
        /// Natural-language description of the change.
        request: String,
        /// Replay all port interactions from a recorded cassette file.
        #[arg(long)]
        cassette: Option<PathBuf>,
    },
    /// Classify text and print which capability would handle it.
    Classify {
        /// The text to classify.
        text: String,
    },
}
