//! Environment-based settings for the CLI surface.
//!
//! All knobs are env vars (loaded from `.env` by the binary via dotenvy):
//! `FOREMAN_PLANNER_MODEL`, `FOREMAN_BUILDER_MODEL`, `FOREMAN_KNOWLEDGE_URL`,
//! `FOREMAN_MAX_TOKENS`, `FOREMAN_CALL_TIMEOUT_SECS`. The live LLM adapter
//! additionally reads `ANTHROPIC_API_KEY` itself.

use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 120;

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Model used by the planning-oriented capability.
    pub planner_model: String,
    /// Model used by the implementation-oriented capability.
    pub builder_model: String,
    /// Base URL of the knowledge retrieval service, when configured.
    pub knowledge_url: Option<String>,
    /// Token budget per completion call.
    pub max_tokens: u32,
    /// Bounded wait applied to every model and knowledge call.
    pub call_timeout: Duration,
}

impl Settings {
    /// Reads settings from the environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            planner_model: env::var("FOREMAN_PLANNER_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.into()),
            builder_model: env::var("FOREMAN_BUILDER_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.into()),
            knowledge_url: env::var("FOREMAN_KNOWLEDGE_URL").ok(),
            max_tokens: parse_env("FOREMAN_MAX_TOKENS", DEFAULT_MAX_TOKENS),
            call_timeout: Duration::from_secs(parse_env(
                "FOREMAN_CALL_TIMEOUT_SECS",
                DEFAULT_CALL_TIMEOUT_SECS,
            )),
        }
    }
}

/// Parses an env var, silently falling back to the default on absence or
/// parse failure.
fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
