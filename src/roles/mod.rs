//! The two model-backed roles: architect (plan, validate) and builder
//! (implement).
//!
//! Both roles are stateless with respect to run data and receive their
//! capability handle and knowledge source by constructor injection, so
//! independent runs can proceed in parallel and tests can substitute fakes.

pub mod architect;
pub mod builder;

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::ports::{KnowledgeChunk, KnowledgeSource};

pub use architect::ArchitectRole;
pub use builder::BuilderRole;

/// Minimum cosine-similarity score a chunk must reach to be used as context.
/// Scores range over `[-1, 1]`; anything below zero is anti-correlated noise.
const MIN_RELEVANCE: f32 = 0.0;

/// Queries the knowledge source with a bounded wait, degrading to no context
/// on failure.
///
/// Retrieval is a grounding aid, not a correctness dependency: a timeout or
/// backend error is logged and the caller proceeds with empty context rather
/// than failing the attempt.
pub(crate) async fn gather_context(
    knowledge: &Arc<dyn KnowledgeSource>,
    query: &str,
    top_k: usize,
    timeout: Duration,
) -> Vec<KnowledgeChunk> {
    match tokio::time::timeout(timeout, knowledge.query(query, top_k)).await {
        Err(_) => {
            warn!(query, ?timeout, "knowledge query timed out; continuing without context");
            Vec::new()
        }
        Ok(Err(e)) => {
            warn!(query, error = %e, "knowledge query failed; continuing without context");
            Vec::new()
        }
        Ok(Ok(chunks)) => chunks.into_iter().filter(|c| c.score >= MIN_RELEVANCE).collect(),
    }
}

/// Extracts the outermost JSON object from free text.
///
/// Models are asked for bare JSON but sometimes wrap it in prose or fences;
/// this recovers the first `{` through the last `}` for a second parse
/// attempt. Returns `None` when no object-shaped span exists.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
