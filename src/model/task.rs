//! Core task and plan types.

use serde::{Deserialize, Serialize};

/// One unit of planned work, produced by the architect and consumed by the
/// builder, harness, and coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique within a plan; stable ordering key (ascending).
    pub id: u32,
    /// Human-readable goal.
    pub description: String,
    /// Opaque identifier of where the change applies (e.g. a file path).
    pub target_location: String,
    /// Detailed natural-language instructions for the builder.
    pub specification: String,
    /// Independently checkable completion conditions. Never empty.
    pub acceptance_criteria: Vec<String>,
    /// Diagnostics accumulated across retry attempts, oldest first.
    /// Append-only: entries are never pruned or rewritten, so every retry
    /// sees every prior failure reason.
    #[serde(default)]
    pub feedback_history: Vec<String>,
}

/// An ordered sequence of tasks for one change request.
///
/// Immutable after creation except for per-task `feedback_history` growth
/// during the retry loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// What the user asked for.
    pub request_summary: String,
    /// Locators of the knowledge chunks consulted during planning.
    #[serde(default)]
    pub context_used: Vec<String>,
    /// Tasks in execution order (`id` ascending).
    pub tasks: Vec<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_history_defaults_to_empty_on_deserialize() {
        let json = r#"{
            "id": 1,
            "description": "add greeting",
            "target_location": "src/lib.rs",
            "specification": "write a greet function",
            "acceptance_criteria": ["returns a greeting"]
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.feedback_history.is_empty());
    }
}
