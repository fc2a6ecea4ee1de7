//! Recording adapter for the `CompletionClient` port.

use std::sync::{Arc, Mutex};

use super::record;
use crate::cassette::format::Outcome;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{CompletionClient, CompletionFuture, CompletionRequest};

/// Records completion interactions while delegating to an inner implementation.
pub struct RecordingCompletionClient {
    inner: Box<dyn CompletionClient>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingCompletionClient {
    /// Creates a new recording completion client wrapping the given implementation.
    pub fn new(inner: Box<dyn CompletionClient>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl CompletionClient for RecordingCompletionClient {
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
        let request = request.clone();

        Box::pin(async move {
            let result = self.inner.complete(&request).await;
            record(&self.recorder, "llm", "complete", &request, Outcome::from_result(&result));
            result
        })
    }
}
