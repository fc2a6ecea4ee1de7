//! Builder output for one task attempt.

use serde::{Deserialize, Serialize};

/// The builder's output for one attempt at one task.
///
/// A fresh value is produced on every builder invocation; retries never
/// mutate an earlier attempt's implementation. The code is not required to
/// be syntactically valid; judging it is the harness's and architect's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    /// The task this implementation is for.
    pub task_id: u32,
    /// The generated code artifact.
    pub code: String,
    /// Optional generated test code.
    #[serde(default)]
    pub self_tests: Option<String>,
    /// 1-based attempt counter, assigned by the coordinator.
    pub attempt_number: u32,
}
