//! Architect role: decomposes requests into plans and validates
//! implementations against acceptance criteria.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{extract_json_object, gather_context};
use crate::error::WorkflowError;
use crate::model::{ArchitectValidation, Implementation, Plan, Task};
use crate::ports::{KnowledgeChunk, KnowledgeSource};
use crate::router::CompletionHandle;

/// How many chunks to retrieve per planning query.
const PLANNING_TOP_K: usize = 5;

/// Maximum characters of a chunk included in a prompt.
const CHUNK_BUDGET: usize = 800;

/// The planning and validating role.
///
/// Holds the planning-oriented completion capability and a knowledge source
/// for grounding; stateless across calls.
pub struct ArchitectRole {
    llm: CompletionHandle,
    knowledge: Arc<dyn KnowledgeSource>,
    knowledge_timeout: Duration,
}

impl ArchitectRole {
    /// Creates an architect over the given capability and knowledge source.
    #[must_use]
    pub fn new(
        llm: CompletionHandle,
        knowledge: Arc<dyn KnowledgeSource>,
        knowledge_timeout: Duration,
    ) -> Self {
        Self { llm, knowledge, knowledge_timeout }
    }

    /// Decomposes a change request into an ordered plan of tasks.
    ///
    /// Queries the knowledge source for grounding context (a retrieval
    /// failure degrades to planning without context), asks the planning
    /// capability for task descriptors, and parses them strictly. Task ids
    /// are reassigned ascending from 1 in the order the model proposed them,
    /// which is the order the coordinator will execute.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::InvalidRequest`] when `request` is empty or
    ///   whitespace-only.
    /// - [`WorkflowError::PlanningFailure`] when the model call fails or no
    ///   structurally valid task survives parsing. Planning is not retried
    ///   here; re-invoking is the caller's decision.
    pub async fn plan(&self, request: &str) -> Result<Plan, WorkflowError> {
        if request.trim().is_empty() {
            return Err(WorkflowError::InvalidRequest(
                "change request is empty or whitespace-only".into(),
            ));
        }

        let mut chunks =
            gather_context(&self.knowledge, request, PLANNING_TOP_K, self.knowledge_timeout).await;
        let reformulation = format!("code structure and conventions relevant to: {request}");
        chunks.extend(
            gather_context(
                &self.knowledge,
                &reformulation,
                PLANNING_TOP_K,
                self.knowledge_timeout,
            )
            .await,
        );
        chunks.dedup_by(|a, b| a.locator == b.locator);
        debug!(chunk_count = chunks.len(), "gathered planning context");

        let prompt = build_planning_prompt(request, &chunks);
        let response = self
            .llm
            .complete_text(prompt)
            .await
            .map_err(|e| WorkflowError::PlanningFailure(e.to_string()))?;

        let tasks = parse_plan_response(&response);
        if tasks.is_empty() {
            return Err(WorkflowError::PlanningFailure(
                "no usable tasks could be parsed from the planning response".into(),
            ));
        }

        info!(task_count = tasks.len(), "plan created");
        Ok(Plan {
            request_summary: request.to_string(),
            context_used: chunks.into_iter().map(|c| c.locator).collect(),
            tasks,
        })
    }

    /// Judges an implementation against a task's acceptance criteria.
    ///
    /// Always returns a well-formed verdict: an empty implementation is
    /// rejected without a model call, and a failed call or unparsable
    /// response becomes a rejection with the problem in the feedback. The
    /// verdict itself is inherently non-deterministic.
    pub async fn validate(&self, task: &Task, implementation: &Implementation) -> ArchitectValidation {
        if implementation.code.trim().is_empty() {
            return ArchitectValidation {
                approved: false,
                feedback: "empty implementation".into(),
            };
        }

        let prompt = build_validation_prompt(task, &implementation.code);
        let response = match self.llm.complete_text(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(task_id = task.id, error = %e, "validation call failed");
                return ArchitectValidation {
                    approved: false,
                    feedback: format!("validation call failed: {e}"),
                };
            }
        };

        parse_validation_response(&response).unwrap_or_else(|| {
            warn!(task_id = task.id, "validation response unparsable");
            ArchitectValidation {
                approved: false,
                feedback: "validation response unparsable".into(),
            }
        })
    }
}

/// Builds the planning prompt: instructions, retrieved context, the request.
fn build_planning_prompt(request: &str, chunks: &[KnowledgeChunk]) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are an architect planning code changes.\n\n\
         Break the request into specific, implementable tasks. Each task must\n\
         change ONE location and carry clear acceptance criteria. Reference\n\
         files and patterns from the context where possible, and require type\n\
         annotations and doc comments in every specification.\n\n",
    );

    prompt.push_str("## Context from codebase\n\n");
    if chunks.is_empty() {
        prompt.push_str("No context available.\n");
    }
    for chunk in chunks {
        let text: String = chunk.text.chars().take(CHUNK_BUDGET).collect();
        let _ = writeln!(prompt, "### {}\n{text}\n", chunk.locator);
    }

    let _ = write!(prompt, "\n## Request\n\n{request}\n\n");

    prompt.push_str(
        "## Instructions\n\n\
         Respond with JSON only (no markdown fences):\n\
         {\n  \
           \"tasks\": [\n    \
             {\n      \
               \"id\": 1,\n      \
               \"description\": \"what to do\",\n      \
               \"target_location\": \"path/to/file\",\n      \
               \"specification\": \"detailed instructions for the implementer\",\n      \
               \"acceptance_criteria\": [\"criterion 1\", \"criterion 2\"]\n    \
             }\n  \
           ]\n\
         }\n",
    );

    prompt
}

/// Builds the validation prompt from the task contract and the candidate code.
fn build_validation_prompt(task: &Task, code: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are an architect validating an implementation.\n\n");
    let _ = writeln!(prompt, "Task: {}", task.description);
    let _ = writeln!(prompt, "Specification: {}", task.specification);
    prompt.push_str("Acceptance criteria:\n");
    for criterion in &task.acceptance_criteria {
        let _ = writeln!(prompt, "  - {criterion}");
    }

    if !task.feedback_history.is_empty() {
        prompt.push_str("\nFeedback from earlier attempts:\n");
        for feedback in &task.feedback_history {
            let _ = writeln!(prompt, "  - {feedback}");
        }
    }

    let _ = write!(prompt, "\nImplementation:\n```\n{code}\n```\n");

    prompt.push_str(
        "\nDecide whether the implementation meets ALL acceptance criteria.\n\
         Respond with JSON only:\n\
         {\"approved\": true or false, \"feedback\": \"explanation of the decision\"}\n",
    );

    prompt
}

/// Task descriptor as proposed by the model; ids are reassigned after parsing.
#[derive(Deserialize)]
struct TaskDescriptor {
    #[serde(default)]
    description: String,
    #[serde(default, alias = "target", alias = "file")]
    target_location: String,
    #[serde(default, alias = "spec")]
    specification: String,
    #[serde(default)]
    acceptance_criteria: Vec<String>,
}

/// Parses the planning response into tasks, dropping structurally invalid
/// descriptors (missing description/target/specification or zero criteria).
fn parse_plan_response(response: &str) -> Vec<Task> {
    #[derive(Deserialize)]
    struct PlanResponse {
        #[serde(default)]
        tasks: Vec<TaskDescriptor>,
    }

    let parsed: Option<PlanResponse> = serde_json::from_str(response).ok().or_else(|| {
        extract_json_object(response).and_then(|json| serde_json::from_str(json).ok())
    });

    let Some(parsed) = parsed else {
        warn!("planning response is not valid JSON");
        return Vec::new();
    };

    let mut tasks = Vec::new();
    for descriptor in parsed.tasks {
        if descriptor.description.trim().is_empty()
            || descriptor.target_location.trim().is_empty()
            || descriptor.specification.trim().is_empty()
            || descriptor.acceptance_criteria.is_empty()
        {
            warn!("dropping structurally invalid task descriptor");
            continue;
        }
        #[allow(clippy::cast_possible_truncation)]
        let id = tasks.len() as u32 + 1;
        tasks.push(Task {
            id,
            description: descriptor.description,
            target_location: descriptor.target_location,
            specification: descriptor.specification,
            acceptance_criteria: descriptor.acceptance_criteria,
            feedback_history: Vec::new(),
        });
    }
    tasks
}

/// Parses the validation response; `None` when the verdict cannot be recovered.
fn parse_validation_response(response: &str) -> Option<ArchitectValidation> {
    #[derive(Deserialize)]
    struct Verdict {
        approved: bool,
        #[serde(default)]
        feedback: String,
    }

    let verdict: Verdict = serde_json::from_str(response).ok().or_else(|| {
        extract_json_object(response).and_then(|json| serde_json::from_str(json).ok())
    })?;

    Some(ArchitectValidation { approved: verdict.approved, feedback: verdict.feedback })
}
