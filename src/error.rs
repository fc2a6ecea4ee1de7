//! Error types for the coordination loop.

use std::time::Duration;

use thiserror::Error;

/// Fatal errors that abort a `process_request` call.
///
/// Everything else (harness rejections, architect disapprovals, model
/// timeouts mid-task) is absorbed into the retry loop or recorded in a
/// [`crate::model::TaskResult`] and never thrown past the coordinator.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The top-level change request was empty or malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Planning produced zero usable tasks.
    #[error("planning failed: {0}")]
    PlanningFailure(String),
}

/// Failure of one bounded model call.
///
/// Internal to the roles: absorbed into disapprovals or empty
/// implementations mid-task, or mapped to
/// [`WorkflowError::PlanningFailure`] during planning.
#[derive(Debug, Error)]
pub enum CallError {
    /// The call did not return within its bound.
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
    /// The underlying client reported an error.
    #[error("model call failed: {0}")]
    Failed(String),
}
