//! Cassette data structures for recording and replaying port interactions.

use std::error::Error;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// What a port call produced: a serialized success value or an error message.
///
/// Every port method in this crate is fallible from the recorder's point of
/// view (even the clock, whose reads simply never take the `Err` arm), so the
/// cassette format carries fallibility first-class instead of by convention.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The call succeeded; the value is the serialized return.
    Ok(serde_json::Value),
    /// The call failed with this message.
    Err(String),
}

impl Outcome {
    /// Captures a success value.
    ///
    /// # Panics
    ///
    /// Panics when the value cannot be serialized; recording only works with
    /// serializable port data.
    #[must_use]
    pub fn ok<T: Serialize>(value: &T) -> Self {
        Self::Ok(serde_json::to_value(value).expect("port return value must serialize"))
    }

    /// Captures a `Result` as returned by a fallible port call.
    #[must_use]
    pub fn from_result<T, E>(result: &Result<T, E>) -> Self
    where
        T: Serialize,
        E: fmt::Display,
    {
        match result {
            Ok(value) => Self::ok(value),
            Err(e) => Self::Err(e.to_string()),
        }
    }

    /// Turns a recorded outcome back into the port call's `Result`.
    ///
    /// # Errors
    ///
    /// Returns the recorded error message, or a deserialization error when
    /// the stored value no longer matches the expected type.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, Box<dyn Error + Send + Sync>> {
        match self {
            Self::Ok(value) => serde_json::from_value(value)
                .map_err(|e| format!("recorded outcome does not deserialize: {e}").into()),
            Self::Err(message) => Err(message.into()),
        }
    }
}

/// A single recorded interaction with an external port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Port name (e.g. "llm", "knowledge", "clock").
    pub port: String,
    /// Method name invoked on the port.
    pub method: String,
    /// Input data sent to the port.
    pub input: serde_json::Value,
    /// What the call produced.
    pub outcome: Outcome,
}

/// A cassette containing a sequence of recorded interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// The change request that was being processed at recording time.
    pub request: String,
    /// Ordered list of interactions.
    pub interactions: Vec<Interaction>,
}
