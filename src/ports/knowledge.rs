//! Knowledge source port for ranked context retrieval.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// Boxed future type alias used by [`KnowledgeSource`] to keep the trait
/// dyn-compatible.
pub type KnowledgeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<KnowledgeChunk>, Box<dyn Error + Send + Sync>>> + Send + 'a>>;

/// A single retrieved chunk of context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeChunk {
    /// The chunk text.
    pub text: String,
    /// Cosine-similarity relevance score in `[-1, 1]`. Callers apply their
    /// own threshold.
    pub score: f32,
    /// Opaque locator of where the chunk came from (e.g. a file path).
    pub locator: String,
}

/// Retrieves ranked context chunks for a query.
///
/// Results are ordered most-relevant first. Retrieval quality is a quality
/// concern, not a correctness one: callers must tolerate empty or poorly
/// ranked results.
pub trait KnowledgeSource: Send + Sync {
    /// Returns up to `top_k` chunks ranked by relevance to `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying retrieval backend fails.
    fn query(&self, text: &str, top_k: usize) -> KnowledgeFuture<'_>;
}
