//! Replaying adapter for the `CompletionClient` port.

use std::sync::{Arc, Mutex};

use super::take_outcome;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{CompletionClient, CompletionFuture, CompletionRequest};

/// Serves recorded completions from a cassette.
pub struct ReplayingCompletionClient {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingCompletionClient {
    /// Create a replaying completion client backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl CompletionClient for ReplayingCompletionClient {
    fn complete(&self, _request: &CompletionRequest) -> CompletionFuture<'_> {
        let outcome = take_outcome(&self.replayer, "llm", "complete");
        Box::pin(async move { outcome.into_result() })
    }
}
