//! Coordinated model roles for validated code changes.
//!
//! `foreman` turns a natural-language change request into one or more
//! validated implementations by coordinating two model roles through a
//! bounded retry loop:
//!
//! 1. The [`roles::ArchitectRole`] decomposes the request into a
//!    [`model::Plan`] of tasks, grounded in retrieved knowledge.
//! 2. For each task, the [`roles::BuilderRole`] produces an implementation,
//!    the [`harness::ValidationHarness`] runs mechanical and behavioral
//!    checks, and the architect judges the survivors against the task's
//!    acceptance criteria.
//! 3. The [`coordinator::Coordinator`] retries failures with accumulated
//!    feedback, up to a fixed bound, and reports per-task outcomes in a
//!    [`model::RunSummary`].
//!
//! External collaborators (language models, knowledge retrieval, time) sit
//! behind the port traits in [`ports`], with live, replaying, and recording
//! adapters in [`adapters`].

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod harness;
pub mod model;
pub mod ports;
pub mod roles;
pub mod router;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution
/// fails.
pub async fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command).await
}
