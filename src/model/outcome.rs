//! Terminal records for tasks and runs.

use serde::{Deserialize, Serialize};

use super::implementation::Implementation;

/// The architect's semantic judgment of an implementation against a task's
/// acceptance criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectValidation {
    /// Whether the implementation satisfies all acceptance criteria.
    pub approved: bool,
    /// Explanation of the verdict; fed back to the builder on rejection.
    pub feedback: String,
}

/// Terminal record for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// The task this result belongs to.
    pub task_id: u32,
    /// Whether the task ultimately succeeded.
    pub success: bool,
    /// Attempts consumed; at most the coordinator's retry bound.
    pub attempts_used: u32,
    /// The final accepted implementation, or the last one tried on failure.
    /// Absent only when the task was never attempted (run cancelled).
    #[serde(default)]
    pub implementation: Option<Implementation>,
    /// Present only when `success` is false.
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// Aggregate outcome over all tasks in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// The original change request.
    pub request: String,
    /// Number of tasks in the plan.
    pub total_tasks: usize,
    /// Number of tasks that succeeded.
    pub successful_tasks: usize,
    /// Number of tasks that failed after retries.
    pub failed_tasks: usize,
    /// Per-task results, in plan order.
    pub results: Vec<TaskResult>,
    /// True iff `failed_tasks == 0`.
    pub overall_success: bool,
}

impl RunSummary {
    /// Builds a summary from per-task results, computing the aggregate counts.
    #[must_use]
    pub fn new(request: impl Into<String>, results: Vec<TaskResult>) -> Self {
        let successful_tasks = results.iter().filter(|r| r.success).count();
        let failed_tasks = results.len() - successful_tasks;
        Self {
            request: request.into(),
            total_tasks: results.len(),
            successful_tasks,
            failed_tasks,
            results,
            overall_success: failed_tasks == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(task_id: u32, success: bool) -> TaskResult {
        TaskResult {
            task_id,
            success,
            attempts_used: 1,
            implementation: None,
            failure_reason: (!success).then(|| "max retries exceeded".to_string()),
        }
    }

    #[test]
    fn summary_counts_add_up() {
        let summary =
            RunSummary::new("req", vec![result(1, true), result(2, false), result(3, true)]);
        assert_eq!(summary.total_tasks, 3);
        assert_eq!(summary.successful_tasks, 2);
        assert_eq!(summary.failed_tasks, 1);
        assert_eq!(summary.total_tasks, summary.successful_tasks + summary.failed_tasks);
        assert!(!summary.overall_success);
    }

    #[test]
    fn overall_success_iff_no_failures() {
        let all_pass = RunSummary::new("req", vec![result(1, true), result(2, true)]);
        assert!(all_pass.overall_success);

        let empty = RunSummary::new("req", vec![]);
        assert!(empty.overall_success);
    }

    #[test]
    fn results_preserve_insertion_order() {
        let summary = RunSummary::new("req", vec![result(3, true), result(1, true), result(2, true)]);
        let ids: Vec<u32> = summary.results.iter().map(|r| r.task_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
