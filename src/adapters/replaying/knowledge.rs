//! Replaying adapter for the `KnowledgeSource` port.

use std::sync::{Arc, Mutex};

use super::take_outcome;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{KnowledgeFuture, KnowledgeSource};

/// Serves recorded retrieval results from a cassette.
pub struct ReplayingKnowledgeSource {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingKnowledgeSource {
    /// Create a replaying knowledge source backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl KnowledgeSource for ReplayingKnowledgeSource {
    fn query(&self, _text: &str, _top_k: usize) -> KnowledgeFuture<'_> {
        let outcome = take_outcome(&self.replayer, "knowledge", "query");
        Box::pin(async move { outcome.into_result() })
    }
}
