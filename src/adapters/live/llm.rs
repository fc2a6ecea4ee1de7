//! Live adapter for the `CompletionClient` port backed by the Anthropic
//! messages API.

use std::env;
use std::error::Error;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::ports::{CompletionClient, CompletionFuture, CompletionRequest, CompletionResponse};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Completion client that calls the Anthropic messages API.
///
/// One client serves both the planning and implementation capabilities; the
/// model named in each request decides which model answers. The API key is
/// read from `ANTHROPIC_API_KEY` once at construction; a missing key is
/// surfaced per call so it flows through the normal failure handling.
pub struct LiveCompletionClient {
    http: Client,
    api_key: Option<String>,
}

impl LiveCompletionClient {
    /// Creates a client keyed from the `ANTHROPIC_API_KEY` environment variable.
    #[must_use]
    pub fn new() -> Self {
        Self { http: Client::new(), api_key: env::var("ANTHROPIC_API_KEY").ok() }
    }

    /// Creates a client with an explicit API key.
    #[must_use]
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self { http: Client::new(), api_key: Some(key.into()) }
    }
}

impl Default for LiveCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesReply {
    content: Vec<TextBlock>,
    usage: TokenUsage,
}

#[derive(Deserialize)]
struct TextBlock {
    text: String,
}

#[derive(Deserialize)]
struct TokenUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Extracts the API's error message from a non-success response body,
/// falling back to the raw body when it is not the documented envelope.
fn api_error_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map_or_else(|_| body.to_string(), |envelope| envelope.error.message);
    format!("anthropic api returned {}: {detail}", status.as_u16())
}

fn boxed(message: String) -> Box<dyn Error + Send + Sync> {
    message.into()
}

impl CompletionClient for LiveCompletionClient {
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
        let request = request.clone();

        Box::pin(async move {
            let Some(api_key) = self.api_key.as_deref() else {
                return Err(boxed("ANTHROPIC_API_KEY is not set".into()));
            };

            let body = MessagesBody {
                model: &request.model,
                max_tokens: request.max_tokens,
                messages: [UserMessage { role: "user", content: &request.prompt }],
            };

            let response = self
                .http
                .post(MESSAGES_URL)
                .header("x-api-key", api_key)
                .header("anthropic-version", API_VERSION)
                .json(&body)
                .send()
                .await
                .map_err(|e| boxed(format!("completion request failed: {e}")))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| boxed(format!("completion response unreadable: {e}")))?;

            if !status.is_success() {
                return Err(api_error_message(status, &text).into());
            }

            let reply: MessagesReply = serde_json::from_str(&text)
                .map_err(|e| boxed(format!("completion response does not parse: {e}")))?;

            Ok(CompletionResponse {
                text: reply.content.into_iter().map(|block| block.text).collect(),
                prompt_tokens: reply.usage.input_tokens,
                completion_tokens: reply.usage.output_tokens,
            })
        })
    }
}
