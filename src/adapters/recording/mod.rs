//! Recording adapters that capture interactions to cassettes.
//!
//! Each adapter delegates to an inner live implementation and appends the
//! input/outcome pair to a shared [`CassetteRecorder`]. The [`Outcome`]
//! captures success and failure alike, so recorded runs replay errors too.

pub mod clock;
pub mod knowledge;
pub mod llm;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::format::Outcome;
use crate::cassette::recorder::CassetteRecorder;

pub use clock::RecordingClock;
pub use knowledge::RecordingKnowledgeSource;
pub use llm::RecordingCompletionClient;

/// Appends one interaction to the shared recorder.
pub(crate) fn record<I: Serialize>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    outcome: Outcome,
) {
    let input_json = serde_json::to_value(input).expect("recording input must serialize");
    let mut guard = recorder.lock().expect("recorder lock poisoned");
    guard.record(port, method, input_json, outcome);
}
