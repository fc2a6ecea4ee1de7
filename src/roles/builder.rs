//! Builder role: produces an implementation for one task.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::gather_context;
use crate::model::{Implementation, Task};
use crate::ports::{KnowledgeChunk, KnowledgeSource};
use crate::router::CompletionHandle;

/// How many code examples to retrieve per implementation query.
const EXAMPLES_TOP_K: usize = 3;

/// Maximum characters of an example included in a prompt.
const EXAMPLE_BUDGET: usize = 600;

/// Function items in generated code, Rust or Python flavored.
static FN_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:pub\s+)?(?:async\s+)?(?:fn|def)\s+(\w+)\s*\(").unwrap());

/// The implementing role.
///
/// Stateless across calls: the attempt counter is assigned by the caller,
/// and every invocation produces a fresh [`Implementation`].
pub struct BuilderRole {
    llm: CompletionHandle,
    knowledge: Arc<dyn KnowledgeSource>,
    knowledge_timeout: Duration,
}

impl BuilderRole {
    /// Creates a builder over the given capability and knowledge source.
    #[must_use]
    pub fn new(
        llm: CompletionHandle,
        knowledge: Arc<dyn KnowledgeSource>,
        knowledge_timeout: Duration,
    ) -> Self {
        Self { llm, knowledge, knowledge_timeout }
    }

    /// Implements a task, seeing the full feedback history of prior attempts.
    ///
    /// Always returns an implementation: a failed or timed-out model call
    /// yields empty code for the harness to reject, never an error. Badness
    /// of generated code is the harness's and architect's job to detect.
    pub async fn implement(&self, task: &Task, attempt_number: u32) -> Implementation {
        let query = format!("code example: {}", task.specification);
        let examples =
            gather_context(&self.knowledge, &query, EXAMPLES_TOP_K, self.knowledge_timeout).await;
        debug!(task_id = task.id, example_count = examples.len(), "gathered code examples");

        let prompt = build_implementation_prompt(task, &examples);
        let code = match self.llm.complete_text(prompt).await {
            Ok(text) => strip_code_fences(&text),
            Err(e) => {
                warn!(task_id = task.id, attempt_number, error = %e, "implementation call failed");
                String::new()
            }
        };

        let self_tests = derive_test_stubs(&code);

        Implementation { task_id: task.id, code, self_tests, attempt_number }
    }
}

/// Builds the implementation prompt: standards, examples, the task contract,
/// and every prior failure reason (oldest first).
fn build_implementation_prompt(task: &Task, examples: &[KnowledgeChunk]) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are a builder implementing one planned code change.\n\n\
         Code standards:\n\
         - Type annotations on every declared function.\n\
         - A doc comment on every declared function.\n\
         - Clean, readable code following the example patterns.\n\n\
         Output only the code. No explanations, no markdown fences.\n\n",
    );

    if !examples.is_empty() {
        prompt.push_str("## Examples from codebase\n\n");
        for example in examples {
            let text: String = example.text.chars().take(EXAMPLE_BUDGET).collect();
            let _ = writeln!(prompt, "### {}\n{text}\n", example.locator);
        }
    }

    let _ = writeln!(prompt, "## Task\n\n{}", task.description);
    let _ = writeln!(prompt, "Target: {}", task.target_location);
    let _ = writeln!(prompt, "Specification: {}", task.specification);
    if !task.acceptance_criteria.is_empty() {
        prompt.push_str("Acceptance criteria:\n");
        for criterion in &task.acceptance_criteria {
            let _ = writeln!(prompt, "  - {criterion}");
        }
    }

    if !task.feedback_history.is_empty() {
        prompt.push_str(
            "\n## Earlier attempts failed\n\n\
             Address every reason below; do not repeat a failed approach.\n",
        );
        for (i, feedback) in task.feedback_history.iter().enumerate() {
            let _ = writeln!(prompt, "{}. {feedback}", i + 1);
        }
    }

    prompt.push_str("\nImplementation:\n");
    prompt
}

/// Strips a single layer of markdown code fences from model output.
fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    // Drop the opening fence (possibly "```rust" or "```python").
    lines.remove(0);
    if lines.last().is_some_and(|l| l.trim_start().starts_with("```")) {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

/// Derives trivial named test stubs for the functions found in `code`.
///
/// A stand-in for model-generated tests: gives the harness's evaluation
/// phase something syntactically checkable per function. Returns `None`
/// when no function items are found.
fn derive_test_stubs(code: &str) -> Option<String> {
    let names: Vec<&str> =
        FN_ITEM.captures_iter(code).filter_map(|c| c.get(1)).map(|m| m.as_str()).collect();
    if names.is_empty() {
        return None;
    }

    let mut tests = String::new();
    for name in names {
        let _ = writeln!(tests, "#[test]");
        let _ = writeln!(tests, "fn exercises_{name}() {{");
        let _ = writeln!(tests, "    let _ = {name};");
        let _ = writeln!(tests, "}}");
    }
    Some(tests)
}
