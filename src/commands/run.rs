//! `foreman run` command: drive one change request through the full loop.
//!
//! Ports are wired three ways: live (the default), replaying from a cassette
//! passed via `--cassette`, or live-with-recording when `FOREMAN_RECORD`
//! names an output file.

use std::env;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::adapters::live::{LiveCompletionClient, LiveKnowledgeSource, SystemClock};
use crate::adapters::recording::{
    RecordingClock, RecordingCompletionClient, RecordingKnowledgeSource,
};
use crate::adapters::replaying::{
    ReplayingClock, ReplayingCompletionClient, ReplayingKnowledgeSource,
};
use crate::cassette::{Cassette, CassetteRecorder, CassetteReplayer};
use crate::config::Settings;
use crate::coordinator::Coordinator;
use crate::harness::ValidationHarness;
use crate::model::RunSummary;
use crate::ports::{Clock, CompletionClient, KnowledgeFuture, KnowledgeSource};
use crate::roles::{ArchitectRole, BuilderRole};
use crate::router::{CompletionHandle, ModelRouter, TaskKind};

/// Bundled port handles for one run.
struct Ports {
    llm: Arc<dyn CompletionClient>,
    knowledge: Arc<dyn KnowledgeSource>,
    clock: Arc<dyn Clock>,
}

/// Knowledge source used when no retrieval service is configured.
///
/// Always errors; the roles log the failure and proceed without context.
struct UnconfiguredKnowledge;

impl KnowledgeSource for UnconfiguredKnowledge {
    fn query(&self, _text: &str, _top_k: usize) -> KnowledgeFuture<'_> {
        Box::pin(async {
            Err("FOREMAN_KNOWLEDGE_URL not set; no knowledge source configured".into())
        })
    }
}

/// Execute the `run` command.
///
/// # Errors
///
/// Returns an error string on a fatal workflow error (invalid request,
/// planning failure), on cassette or recording I/O problems, or when any
/// task ultimately failed (so the process exit code reflects the outcome).
pub async fn run(request: &str, cassette: Option<&Path>) -> Result<(), String> {
    let settings = Settings::from_env();
    info!(kind = %ModelRouter::classify(request), "request classified");

    let (ports, recorder) = build_ports(request, cassette, &settings)?;

    let planner = CompletionHandle::new(
        Arc::clone(&ports.llm),
        settings.planner_model.clone(),
        settings.max_tokens,
        settings.call_timeout,
    );
    let builder_handle = CompletionHandle::new(
        Arc::clone(&ports.llm),
        settings.builder_model.clone(),
        settings.max_tokens,
        settings.call_timeout,
    );
    let router = ModelRouter::new(planner, builder_handle);

    let architect = ArchitectRole::new(
        router.route(TaskKind::Planning).clone(),
        Arc::clone(&ports.knowledge),
        settings.call_timeout,
    );
    let builder = BuilderRole::new(
        router.route(TaskKind::Implementing).clone(),
        Arc::clone(&ports.knowledge),
        settings.call_timeout,
    );
    let harness = ValidationHarness::new(Arc::clone(&ports.clock));
    let coordinator = Coordinator::new(architect, builder, harness);

    let outcome = coordinator.process_request(request).await;

    // Release every port reference before finishing the recording, so the
    // recorder can be taken out of its shared handle.
    drop(coordinator);
    drop(router);
    drop(ports);
    if let Some(recorder) = recorder {
        finish_recording(recorder)?;
    }

    let summary = outcome.map_err(|e| e.to_string())?;
    println!("{}", format_summary(&summary));

    if summary.overall_success {
        Ok(())
    } else {
        Err(format!("{} of {} tasks failed", summary.failed_tasks, summary.total_tasks))
    }
}

/// Builds the port set: replaying when a cassette is given, otherwise live,
/// optionally wrapped in recording adapters when `FOREMAN_RECORD` is set.
fn build_ports(
    request: &str,
    cassette: Option<&Path>,
    settings: &Settings,
) -> Result<(Ports, Option<Arc<Mutex<CassetteRecorder>>>), String> {
    if let Some(path) = cassette {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read cassette file {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("failed to parse cassette file {}: {e}", path.display()))?;
        let replayer = Arc::new(Mutex::new(CassetteReplayer::new(&cassette)));

        return Ok((
            Ports {
                llm: Arc::new(ReplayingCompletionClient::new(Arc::clone(&replayer))),
                knowledge: Arc::new(ReplayingKnowledgeSource::new(Arc::clone(&replayer))),
                clock: Arc::new(ReplayingClock::new(replayer)),
            },
            None,
        ));
    }

    let llm: Box<dyn CompletionClient> = Box::new(LiveCompletionClient::new());
    let knowledge: Box<dyn KnowledgeSource> = match &settings.knowledge_url {
        Some(url) => Box::new(LiveKnowledgeSource::new(url.clone())),
        None => Box::new(UnconfiguredKnowledge),
    };
    let clock: Box<dyn Clock> = Box::new(SystemClock);

    if let Ok(record_path) = env::var("FOREMAN_RECORD") {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            record_path,
            format!("foreman-{}", uuid::Uuid::new_v4()),
            request,
        )));
        let ports = Ports {
            llm: Arc::new(RecordingCompletionClient::new(llm, Arc::clone(&recorder))),
            knowledge: Arc::new(RecordingKnowledgeSource::new(knowledge, Arc::clone(&recorder))),
            clock: Arc::new(RecordingClock::new(clock, Arc::clone(&recorder))),
        };
        return Ok((ports, Some(recorder)));
    }

    Ok((Ports { llm: Arc::from(llm), knowledge: Arc::from(knowledge), clock: Arc::from(clock) }, None))
}

/// Writes the cassette captured during a recorded run.
fn finish_recording(recorder: Arc<Mutex<CassetteRecorder>>) -> Result<(), String> {
    match Arc::try_unwrap(recorder) {
        Ok(mutex) => {
            let recorder =
                mutex.into_inner().map_err(|_| "recorder lock poisoned".to_string())?;
            let path =
                recorder.finish().map_err(|e| format!("failed to write cassette: {e}"))?;
            eprintln!("Recording saved to: {}", path.display());
            Ok(())
        }
        Err(_) => Err("recorder still referenced; cassette not written".into()),
    }
}

/// Formats a run summary as a human-readable report.
#[must_use]
pub fn format_summary(summary: &RunSummary) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Request: {}", summary.request));
    lines.push(format!("Tasks: {}/{} succeeded", summary.successful_tasks, summary.total_tasks));
    lines.push(String::new());
    for result in &summary.results {
        let status = if result.success { "OK  " } else { "FAIL" };
        let mut line =
            format!("  [{status}] task {}: {} attempt(s)", result.task_id, result.attempts_used);
        if let Some(reason) = &result.failure_reason {
            line.push_str(" (");
            line.push_str(reason);
            line.push(')');
        }
        lines.push(line);
    }
    lines.push(String::new());
    let overall = if summary.overall_success { "SUCCEEDED" } else { "FAILED" };
    lines.push(format!("Result: {overall}"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskResult;

    fn task_result(task_id: u32, success: bool, attempts: u32) -> TaskResult {
        TaskResult {
            task_id,
            success,
            attempts_used: attempts,
            implementation: None,
            failure_reason: (!success).then(|| "max retries exceeded".to_string()),
        }
    }

    #[test]
    fn format_summary_reports_mixed_outcome() {
        let summary = RunSummary::new(
            "add two functions",
            vec![task_result(1, true, 2), task_result(2, false, 3)],
        );
        let report = format_summary(&summary);

        assert!(report.contains("Request: add two functions"));
        assert!(report.contains("Tasks: 1/2 succeeded"));
        assert!(report.contains("[OK  ] task 1: 2 attempt(s)"));
        assert!(report.contains("[FAIL] task 2: 3 attempt(s) (max retries exceeded)"));
        assert!(report.contains("Result: FAILED"));
    }

    #[test]
    fn format_summary_reports_full_success() {
        let summary = RunSummary::new("one change", vec![task_result(1, true, 1)]);
        let report = format_summary(&summary);
        assert!(report.contains("Result: SUCCEEDED"));
    }

    #[tokio::test]
    async fn unconfigured_knowledge_reports_clear_error() {
        let err = UnconfiguredKnowledge.query("anything", 3).await.unwrap_err();
        assert!(err.to_string().contains("FOREMAN_KNOWLEDGE_URL"));
    }
}
