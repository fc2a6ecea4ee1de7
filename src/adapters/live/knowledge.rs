//! Live adapter for the `KnowledgeSource` port backed by an HTTP retrieval service.
//!
//! The retrieval service (index construction, chunking, embedding) is an
//! external collaborator; this adapter only speaks its query endpoint:
//! `POST <base_url>/query` with `{"query": ..., "top_k": ...}`, answered by
//! a JSON array of `{text, score, locator}` objects.

use reqwest::Client;
use serde::Serialize;

use crate::ports::{KnowledgeChunk, KnowledgeFuture, KnowledgeSource};

/// Live knowledge source that queries an HTTP retrieval service.
pub struct LiveKnowledgeSource {
    client: Client,
    base_url: String,
}

impl LiveKnowledgeSource {
    /// Creates a new live knowledge source for the given service base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: Client::new(), base_url: base_url.into() }
    }
}

/// Request body sent to the retrieval service.
#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    top_k: usize,
}

impl KnowledgeSource for LiveKnowledgeSource {
    fn query(&self, text: &str, top_k: usize) -> KnowledgeFuture<'_> {
        let text = text.to_string();
        let url = format!("{}/query", self.base_url.trim_end_matches('/'));

        Box::pin(async move {
            let body = QueryRequest { query: &text, top_k };

            let response = self.client.post(&url).json(&body).send().await.map_err(
                |e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("knowledge query request failed: {e}").into()
                },
            )?;

            let status = response.status();
            let response_text =
                response.text().await.map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("failed to read knowledge query response: {e}").into()
                })?;

            if !status.is_success() {
                return Err(
                    format!("knowledge service error ({}): {response_text}", status.as_u16())
                        .into(),
                );
            }

            let chunks: Vec<KnowledgeChunk> = serde_json::from_str(&response_text).map_err(
                |e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("failed to parse knowledge query response: {e}").into()
                },
            )?;

            Ok(chunks)
        })
    }
}
