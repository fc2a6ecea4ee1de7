//! Pure per-task retry state machine.
//!
//! The coordinator drives each task through this machine; transitions are a
//! pure function of the current state and the attempt's verdict, so the
//! retry policy is testable without invoking any model.

/// Where a task stands in its retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Attempt `n` (1-based) is the next to run.
    Attempting(u32),
    /// The architect approved an implementation after `attempts` attempts.
    Succeeded {
        /// Attempts consumed, including the approved one.
        attempts: u32,
    },
    /// Every allowed attempt was consumed without approval.
    Exhausted,
}

/// Verdict of one builder/harness/architect cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptVerdict {
    /// The harness found mechanical or behavioral problems.
    HarnessRejected,
    /// The harness passed but the architect disapproved.
    ArchitectRejected,
    /// The harness passed and the architect approved.
    Approved,
}

/// Advances the task state given the latest attempt's verdict.
///
/// Terminal states absorb further input. A rejection on the final allowed
/// attempt transitions to [`TaskState::Exhausted`]; otherwise the attempt
/// counter advances.
#[must_use]
pub fn advance(state: TaskState, verdict: AttemptVerdict, max_retries: u32) -> TaskState {
    let TaskState::Attempting(attempt) = state else {
        return state;
    };

    match verdict {
        AttemptVerdict::Approved => TaskState::Succeeded { attempts: attempt },
        AttemptVerdict::HarnessRejected | AttemptVerdict::ArchitectRejected => {
            if attempt >= max_retries {
                TaskState::Exhausted
            } else {
                TaskState::Attempting(attempt + 1)
            }
        }
    }
}
