//! Replays recorded interactions from a cassette.

use std::collections::HashMap;
use std::collections::VecDeque;

use super::format::{Cassette, Interaction};

/// Hands out a cassette's interactions, draining one queue per port/method
/// pair.
///
/// Calls against different ports may interleave in any order at replay time;
/// each pair still replays its own interactions in recorded order.
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Loads a replayer from a cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Removes and returns the next interaction recorded for `port`/`method`.
    ///
    /// # Panics
    ///
    /// Panics when the cassette holds no further interaction for that pair.
    /// A replay mismatch means the code under replay diverged from the
    /// recorded run, which is not recoverable; the message lists what the
    /// cassette still holds so the divergence is easy to locate.
    pub fn take(&mut self, port: &str, method: &str) -> Interaction {
        let key = (port.to_string(), method.to_string());
        match self.queues.get_mut(&key).and_then(VecDeque::pop_front) {
            Some(interaction) => interaction,
            None => panic!(
                "cassette exhausted for {port}::{method}; remaining: [{}]",
                self.remaining_summary()
            ),
        }
    }

    /// Lists non-empty queues as `port::method(count)` entries.
    fn remaining_summary(&self) -> String {
        let mut entries: Vec<String> = self
            .queues
            .iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|((port, method), q)| format!("{port}::{method}({})", q.len()))
            .collect();
        entries.sort();
        entries.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Outcome;
    use chrono::Utc;
    use serde_json::json;

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            request: "test request".into(),
            interactions,
        }
    }

    fn llm_interaction(seq: u64, text: &str) -> Interaction {
        Interaction {
            seq,
            port: "llm".into(),
            method: "complete".into(),
            input: json!({}),
            outcome: Outcome::Ok(json!({ "text": text })),
        }
    }

    #[test]
    fn interleaved_ports_replay_in_per_pair_order() {
        let cassette = make_cassette(vec![
            llm_interaction(0, "first"),
            Interaction {
                seq: 1,
                port: "knowledge".into(),
                method: "query".into(),
                input: json!({"text": "x"}),
                outcome: Outcome::Ok(json!([])),
            },
            llm_interaction(2, "second"),
        ]);

        let mut replayer = CassetteReplayer::new(&cassette);

        assert_eq!(replayer.take("llm", "complete").seq, 0);
        assert_eq!(replayer.take("knowledge", "query").seq, 1);
        let last = replayer.take("llm", "complete");
        assert_eq!(last.seq, 2);
        assert_eq!(last.outcome, Outcome::Ok(json!({"text": "second"})));
    }

    #[test]
    #[should_panic(expected = "cassette exhausted for llm::complete")]
    fn draining_an_empty_queue_panics() {
        let cassette = make_cassette(vec![llm_interaction(0, "only")]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let _ = replayer.take("llm", "complete");
        let _ = replayer.take("llm", "complete");
    }

    #[test]
    #[should_panic(expected = "cassette exhausted for clock::now")]
    fn unrecorded_pair_panics() {
        let cassette = make_cassette(vec![]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let _ = replayer.take("clock", "now");
    }

    #[test]
    fn panic_message_lists_remaining_queues() {
        let cassette = make_cassette(vec![llm_interaction(0, "left over")]);
        let mut replayer = CassetteReplayer::new(&cassette);
        assert_eq!(replayer.remaining_summary(), "llm::complete(1)");
        let _ = replayer.take("llm", "complete");
        assert_eq!(replayer.remaining_summary(), "");
    }
}
