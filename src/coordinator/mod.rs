//! Coordinator: drives the plan/implement/validate/retry loop.
//!
//! One `process_request` call owns its plan, task results, and summary
//! exclusively; nothing is retained across calls, so independent runs can
//! proceed in parallel with separate coordinators.

pub mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::WorkflowError;
use crate::harness::{describe_failure, ValidationHarness};
use crate::model::{RunSummary, Task, TaskResult};
use crate::roles::{ArchitectRole, BuilderRole};
use state::{advance, AttemptVerdict, TaskState};

/// Orchestrates the architect, builder, and harness for one request at a time.
pub struct Coordinator {
    architect: ArchitectRole,
    builder: BuilderRole,
    harness: ValidationHarness,
    cancel: Option<Arc<AtomicBool>>,
}

impl Coordinator {
    /// Upper bound on attempts per task. Exhausting it fails the task, not
    /// the run.
    pub const MAX_RETRIES: u32 = 3;

    /// Creates a coordinator over the given roles and harness.
    #[must_use]
    pub fn new(architect: ArchitectRole, builder: BuilderRole, harness: ValidationHarness) -> Self {
        Self { architect, builder, harness, cancel: None }
    }

    /// Installs a cancellation flag, checked only at task boundaries.
    ///
    /// In-flight builder/harness/architect calls are not preempted; they
    /// complete (or time out) and the run stops before the next task.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Processes a change request through the full workflow.
    ///
    /// Tasks are processed strictly in plan order; a failed task never
    /// aborts the run or reorders later tasks, and partial success is
    /// reported in the summary.
    ///
    /// # Errors
    ///
    /// Only [`WorkflowError::InvalidRequest`] and
    /// [`WorkflowError::PlanningFailure`] escape; every other failure is
    /// absorbed into the retry loop or recorded per task.
    pub async fn process_request(&self, request: &str) -> Result<RunSummary, WorkflowError> {
        info!(request = %truncate(request, 100), "processing request");

        let plan = self.architect.plan(request).await?;
        let mut tasks = plan.tasks;

        let mut results = Vec::with_capacity(tasks.len());
        for task in &mut tasks {
            if self.is_cancelled() {
                warn!(task_id = task.id, "run cancelled; task not attempted");
                results.push(TaskResult {
                    task_id: task.id,
                    success: false,
                    attempts_used: 0,
                    implementation: None,
                    failure_reason: Some("run cancelled".into()),
                });
                continue;
            }

            let result = self.process_task(task).await;
            if !result.success {
                warn!(
                    task_id = task.id,
                    attempts = result.attempts_used,
                    "task failed after retries"
                );
            }
            results.push(result);
        }

        let summary = RunSummary::new(plan.request_summary, results);
        info!(
            total = summary.total_tasks,
            successful = summary.successful_tasks,
            failed = summary.failed_tasks,
            "run complete"
        );
        Ok(summary)
    }

    /// Drives one task through the retry state machine.
    ///
    /// Each cycle: builder implements (seeing the full feedback history),
    /// the harness checks mechanically, and only a clean harness result goes
    /// to the architect for semantic validation. Every rejection appends to
    /// the task's feedback history before the next attempt.
    async fn process_task(&self, task: &mut Task) -> TaskResult {
        let mut task_state = TaskState::Attempting(1);
        let mut last_implementation = None;

        while let TaskState::Attempting(attempt) = task_state {
            info!(task_id = task.id, attempt, max = Self::MAX_RETRIES, "attempting task");

            let implementation = self.builder.implement(task, attempt).await;
            let ove = self.harness.run(&implementation);

            let verdict = if ove.overall_passed {
                let validation = self.architect.validate(task, &implementation).await;
                if validation.approved {
                    info!(task_id = task.id, attempt, "architect approved implementation");
                    AttemptVerdict::Approved
                } else {
                    info!(
                        task_id = task.id,
                        attempt,
                        feedback = %truncate(&validation.feedback, 100),
                        "architect rejected implementation"
                    );
                    task.feedback_history.push(validation.feedback);
                    AttemptVerdict::ArchitectRejected
                }
            } else {
                let feedback = describe_failure(&ove);
                info!(task_id = task.id, attempt, feedback = %truncate(&feedback, 100), "harness rejected implementation");
                task.feedback_history.push(feedback);
                AttemptVerdict::HarnessRejected
            };

            last_implementation = Some(implementation);
            task_state = advance(task_state, verdict, Self::MAX_RETRIES);
        }

        match task_state {
            TaskState::Succeeded { attempts } => TaskResult {
                task_id: task.id,
                success: true,
                attempts_used: attempts,
                implementation: last_implementation,
                failure_reason: None,
            },
            TaskState::Exhausted => TaskResult {
                task_id: task.id,
                success: false,
                attempts_used: Self::MAX_RETRIES,
                implementation: last_implementation,
                failure_reason: Some("max retries exceeded".into()),
            },
            TaskState::Attempting(_) => unreachable!("loop exits only on terminal states"),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Truncates a string for log output.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
