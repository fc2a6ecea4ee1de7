//! Full-loop integration tests driven by replayed cassettes.
//!
//! Each test hand-builds a cassette of port interactions, wires the
//! coordinator over replaying adapters, and asserts on the resulting
//! summary. No network, no real clock: replays are fully deterministic.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use foreman::adapters::replaying::{
    ReplayingClock, ReplayingCompletionClient, ReplayingKnowledgeSource,
};
use foreman::cassette::{Cassette, CassetteReplayer, Interaction, Outcome};
use foreman::coordinator::Coordinator;
use foreman::harness::ValidationHarness;
use foreman::roles::{ArchitectRole, BuilderRole};
use foreman::router::{CompletionHandle, ModelRouter, TaskKind};

const GOOD_CODE: &str = "/// Reverses a string.\nfn reverse(input: &str) -> String {\n    input.chars().rev().collect()\n}";
const BARE_CODE: &str = "def reverse(s):\n    return s[::-1]";

/// Builds a cassette whose llm/knowledge/clock queues serve the given
/// responses in order.
fn make_cassette(
    llm_responses: &[&str],
    knowledge_count: usize,
    clock_count: usize,
) -> Cassette {
    let mut interactions = Vec::new();
    let mut seq = 0;

    for response in llm_responses {
        interactions.push(Interaction {
            seq,
            port: "llm".into(),
            method: "complete".into(),
            input: json!({}),
            outcome: Outcome::Ok(json!({
                "text": response,
                "prompt_tokens": 100,
                "completion_tokens": 50
            })),
        });
        seq += 1;
    }
    for _ in 0..knowledge_count {
        interactions.push(Interaction {
            seq,
            port: "knowledge".into(),
            method: "query".into(),
            input: json!({}),
            outcome: Outcome::Ok(json!([])),
        });
        seq += 1;
    }
    for i in 0..clock_count {
        interactions.push(Interaction {
            seq,
            port: "clock".into(),
            method: "now".into(),
            input: json!({}),
            outcome: Outcome::Ok(json!(format!("2025-03-01T12:00:{i:02}Z"))),
        });
        seq += 1;
    }

    Cassette {
        name: "run-loop-test".into(),
        recorded_at: Utc::now(),
        request: "test".into(),
        interactions,
    }
}

/// Wires a coordinator over replaying adapters for the given cassette.
fn coordinator_from(cassette: &Cassette) -> Coordinator {
    let replayer = Arc::new(Mutex::new(CassetteReplayer::new(cassette)));
    let llm = Arc::new(ReplayingCompletionClient::new(Arc::clone(&replayer)));
    let knowledge = Arc::new(ReplayingKnowledgeSource::new(Arc::clone(&replayer)));
    let clock = Arc::new(ReplayingClock::new(replayer));

    let planner = CompletionHandle::new(
        Arc::clone(&llm) as _,
        "planner-model",
        1024,
        Duration::from_secs(5),
    );
    let builder_handle =
        CompletionHandle::new(llm as _, "builder-model", 2048, Duration::from_secs(5));
    let router = ModelRouter::new(planner, builder_handle);

    let architect = ArchitectRole::new(
        router.route(TaskKind::Planning).clone(),
        Arc::clone(&knowledge) as _,
        Duration::from_secs(1),
    );
    let builder = BuilderRole::new(
        router.route(TaskKind::Implementing).clone(),
        knowledge as _,
        Duration::from_secs(1),
    );
    Coordinator::new(architect, builder, ValidationHarness::new(clock))
}

fn plan_response() -> String {
    serde_json::to_string(&json!({
        "tasks": [{
            "description": "Add a function that reverses a string",
            "target_location": "src/lib.rs",
            "specification": "Write a reverse function with type annotations and a doc comment",
            "acceptance_criteria": ["reverses its input"]
        }]
    }))
    .unwrap()
}

fn approval() -> String {
    serde_json::to_string(&json!({"approved": true, "feedback": "meets all criteria"})).unwrap()
}

#[tokio::test]
async fn bare_code_then_annotated_code_succeeds_in_two_attempts() {
    // llm order: plan, builder attempt 1 (bare, harness-rejected, no
    // validation call), builder attempt 2 (good), validation approval.
    // knowledge: 2 planning queries + 1 per builder attempt.
    // clock: one observation per harness run.
    let cassette =
        make_cassette(&[&plan_response(), BARE_CODE, GOOD_CODE, &approval()], 4, 2);
    let coordinator = coordinator_from(&cassette);

    let summary =
        coordinator.process_request("Add a function that reverses a string").await.unwrap();

    assert!(summary.overall_success);
    assert_eq!(summary.total_tasks, 1);
    assert_eq!(summary.successful_tasks, 1);
    assert_eq!(summary.failed_tasks, 0);

    let result = &summary.results[0];
    assert!(result.success);
    assert_eq!(result.attempts_used, 2);
    let implementation = result.implementation.as_ref().unwrap();
    assert_eq!(implementation.code, GOOD_CODE);
    assert_eq!(implementation.attempt_number, 2);
}

#[tokio::test]
async fn builder_that_never_produces_code_exhausts_retries() {
    // Three empty builder responses; the harness rejects each before any
    // validation call happens.
    let cassette = make_cassette(&[&plan_response(), "", "", ""], 5, 3);
    let coordinator = coordinator_from(&cassette);

    let summary = coordinator.process_request("Add a reverse function").await.unwrap();

    assert!(!summary.overall_success);
    assert_eq!(summary.failed_tasks, 1);
    let result = &summary.results[0];
    assert!(!result.success);
    assert_eq!(result.attempts_used, 3);
    assert_eq!(result.failure_reason.as_deref(), Some("max retries exceeded"));
}

#[tokio::test]
async fn replaying_the_same_cassette_twice_is_deterministic() {
    let cassette =
        make_cassette(&[&plan_response(), BARE_CODE, GOOD_CODE, &approval()], 4, 2);

    let first = coordinator_from(&cassette)
        .process_request("Add a function that reverses a string")
        .await
        .unwrap();
    let second = coordinator_from(&cassette)
        .process_request("Add a function that reverses a string")
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn results_follow_plan_order_across_mixed_outcomes() {
    let two_task_plan = serde_json::to_string(&json!({
        "tasks": [
            {
                "description": "first change",
                "target_location": "src/a.rs",
                "specification": "spec a",
                "acceptance_criteria": ["ok"]
            },
            {
                "description": "second change",
                "target_location": "src/b.rs",
                "specification": "spec b",
                "acceptance_criteria": ["ok"]
            }
        ]
    }))
    .unwrap();

    // Task 1 exhausts on empty code (3 attempts); task 2 succeeds first try.
    // knowledge: 2 planning + 3 + 1 builder queries; clock: 4 harness runs.
    let cassette = make_cassette(
        &[&two_task_plan, "", "", "", GOOD_CODE, &approval()],
        6,
        4,
    );
    let coordinator = coordinator_from(&cassette);

    let summary = coordinator.process_request("two changes").await.unwrap();

    assert_eq!(summary.total_tasks, 2);
    assert_eq!(summary.successful_tasks, 1);
    assert_eq!(summary.failed_tasks, 1);
    assert!(!summary.overall_success);
    assert_eq!(summary.total_tasks, summary.successful_tasks + summary.failed_tasks);

    // Plan order is preserved even though task 1 failed.
    assert_eq!(summary.results[0].task_id, 1);
    assert!(!summary.results[0].success);
    assert_eq!(summary.results[1].task_id, 2);
    assert!(summary.results[1].success);
}
