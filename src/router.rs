//! Task classification and completion-capability routing.
//!
//! Two model capabilities exist: a planning-oriented one (architect work:
//! planning, reasoning, validation) and an implementation-oriented one
//! (builder work: code generation, tests). The router classifies free text
//! into a [`TaskKind`] by keyword heuristics and maps every kind to exactly
//! one capability. Classification is best-effort; a misrouted task is a
//! quality problem, never an error.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CallError;
use crate::ports::{CompletionClient, CompletionRequest};

/// Closed classification of a piece of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Decomposing a request into tasks.
    Planning,
    /// Writing or changing code.
    Implementing,
    /// Explanation and analysis.
    Reasoning,
    /// Writing or running tests.
    Testing,
    /// Nothing matched; handled like planning-adjacent work.
    Unknown,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Planning => "planning",
            Self::Implementing => "implementing",
            Self::Reasoning => "reasoning",
            Self::Testing => "testing",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A completion capability: a client paired with a concrete model, token
/// budget, and per-call timeout.
///
/// Every call through a handle is wrapped in a bounded wait; a timeout is
/// reported as a [`CallError`] for the caller to absorb rather than an
/// unbounded hang.
#[derive(Clone)]
pub struct CompletionHandle {
    client: Arc<dyn CompletionClient>,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl CompletionHandle {
    /// Creates a handle for the given client and model settings.
    #[must_use]
    pub fn new(
        client: Arc<dyn CompletionClient>,
        model: impl Into<String>,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        Self { client, model: model.into(), max_tokens, timeout }
    }

    /// The model identifier this handle completes with.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a prompt and returns the completion text.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Timeout`] when the call exceeds the handle's
    /// bound and [`CallError::Failed`] when the client reports an error.
    pub async fn complete_text(&self, prompt: String) -> Result<String, CallError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt,
            max_tokens: self.max_tokens,
        };
        match tokio::time::timeout(self.timeout, self.client.complete(&request)).await {
            Err(_) => Err(CallError::Timeout(self.timeout)),
            Ok(Err(e)) => Err(CallError::Failed(e.to_string())),
            Ok(Ok(response)) => Ok(response.text),
        }
    }
}

/// Keywords indicating implementation work.
const IMPLEMENTING_KEYWORDS: &[&str] = &[
    "implement",
    "write",
    "code",
    "function",
    "fn ",
    "class ",
    "add method",
    "generate",
    "fix bug",
    "refactor",
];

/// Keywords indicating test work.
const TESTING_KEYWORDS: &[&str] = &["test", "assert", "coverage"];

/// Keywords indicating planning work.
const PLANNING_KEYWORDS: &[&str] =
    &["plan", "break down", "design", "architect", "organize", "structure", "outline", "strategy"];

/// Keywords indicating reasoning work.
const REASONING_KEYWORDS: &[&str] = &[
    "explain",
    "why",
    "how does",
    "what is",
    "understand",
    "analyze",
    "evaluate",
    "compare",
    "describe",
];

/// Routes work to the planning-oriented or implementation-oriented
/// completion capability.
pub struct ModelRouter {
    planner: CompletionHandle,
    builder: CompletionHandle,
}

impl ModelRouter {
    /// Creates a router over the two capability handles.
    #[must_use]
    pub fn new(planner: CompletionHandle, builder: CompletionHandle) -> Self {
        Self { planner, builder }
    }

    /// Classifies free text into a [`TaskKind`] by keyword matching.
    ///
    /// Checks testing before implementing so that "write a test" routes as
    /// test work; everything unmatched is [`TaskKind::Unknown`].
    #[must_use]
    pub fn classify(text: &str) -> TaskKind {
        let lower = text.to_lowercase();

        if TESTING_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return TaskKind::Testing;
        }
        if IMPLEMENTING_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return TaskKind::Implementing;
        }
        if PLANNING_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return TaskKind::Planning;
        }
        if REASONING_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return TaskKind::Reasoning;
        }
        TaskKind::Unknown
    }

    /// Returns the capability for a task kind.
    ///
    /// The mapping is fixed and total: planning, reasoning, and unknown work
    /// goes to the planner; implementing and testing work to the builder.
    #[must_use]
    pub fn route(&self, kind: TaskKind) -> &CompletionHandle {
        match kind {
            TaskKind::Planning | TaskKind::Reasoning | TaskKind::Unknown => &self.planner,
            TaskKind::Implementing | TaskKind::Testing => &self.builder,
        }
    }

    /// Classifies a request, routes it, and returns the completion text.
    ///
    /// # Errors
    ///
    /// Returns a [`CallError`] if the routed completion call fails or times out.
    pub async fn dispatch(&self, text: &str) -> Result<String, CallError> {
        let kind = Self::classify(text);
        tracing::debug!(%kind, "dispatching ad-hoc request");
        self.route(kind).complete_text(text.to_string()).await
    }
}
