//! Command dispatch and handlers.

pub mod classify;
pub mod run;

use crate::cli::Command;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub async fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Run { request, cassette } => run::run(request, cassette.as_deref()).await,
        Command::Classify { text } => classify::run(text),
    }
}
