//! Replaying adapters that serve recorded interactions.
//!
//! All adapters share one [`CassetteReplayer`] behind a mutex; the replayer
//! drains an independent queue per port/method pair, so interleaved calls
//! from different ports replay in their recorded per-port order.

pub mod clock;
pub mod knowledge;
pub mod llm;

use std::sync::{Arc, Mutex};

use crate::cassette::format::Outcome;
use crate::cassette::replayer::CassetteReplayer;

pub use clock::ReplayingClock;
pub use knowledge::ReplayingKnowledgeSource;
pub use llm::ReplayingCompletionClient;

/// Takes the next recorded outcome for the given port/method.
pub(crate) fn take_outcome(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Outcome {
    replayer.lock().expect("replayer lock poisoned").take(port, method).outcome
}
