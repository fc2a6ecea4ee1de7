//! Recording adapter for the `KnowledgeSource` port.

use std::sync::{Arc, Mutex};

use serde_json::json;

use super::record;
use crate::cassette::format::Outcome;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{KnowledgeFuture, KnowledgeSource};

/// Records retrieval interactions while delegating to an inner implementation.
pub struct RecordingKnowledgeSource {
    inner: Box<dyn KnowledgeSource>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingKnowledgeSource {
    /// Creates a new recording knowledge source wrapping the given implementation.
    pub fn new(inner: Box<dyn KnowledgeSource>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl KnowledgeSource for RecordingKnowledgeSource {
    fn query(&self, text: &str, top_k: usize) -> KnowledgeFuture<'_> {
        let text = text.to_string();

        Box::pin(async move {
            let result = self.inner.query(&text, top_k).await;
            record(
                &self.recorder,
                "knowledge",
                "query",
                &json!({"text": text, "top_k": top_k}),
                Outcome::from_result(&result),
            );
            result
        })
    }
}
