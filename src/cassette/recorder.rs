//! Records interactions into a cassette file.

use std::io;
use std::path::PathBuf;

use chrono::Utc;

use super::format::{Cassette, Interaction, Outcome};

/// Accumulates interactions during a run and writes them out as one YAML
/// cassette when the run finishes.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    request: String,
    interactions: Vec<Interaction>,
}

impl CassetteRecorder {
    /// Creates a recorder that will write to `path` when finished.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        request: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            request: request.into(),
            interactions: Vec::new(),
        }
    }

    /// Appends one interaction; sequence numbers follow insertion order.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: serde_json::Value,
        outcome: Outcome,
    ) {
        self.interactions.push(Interaction {
            seq: self.interactions.len() as u64,
            port: port.into(),
            method: method.into(),
            input,
            outcome,
        });
    }

    /// Writes the cassette to disk and returns its path.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the filesystem write fails.
    pub fn finish(self) -> Result<PathBuf, io::Error> {
        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            request: self.request,
            interactions: self.interactions,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(&cassette).map_err(io::Error::other)?;
        std::fs::write(&self.path, yaml)?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_and_finish() {
        let dir = std::env::temp_dir().join("foreman_cassette_test");
        let path = dir.join("nested").join("test.cassette.yaml");

        let mut recorder = CassetteRecorder::new(&path, "test-recording", "add a function");
        recorder.record(
            "llm",
            "complete",
            json!({"prompt": "hi"}),
            Outcome::Ok(json!({"text": "bye"})),
        );
        recorder.record("knowledge", "query", json!({"text": "q"}), Outcome::Ok(json!([])));
        recorder.record("clock", "now", json!({}), Outcome::Ok(json!("2025-03-01T00:00:00Z")));

        let written = recorder.finish().expect("finish should succeed");
        assert_eq!(written, path);

        let content = std::fs::read_to_string(&path).unwrap();
        let cassette: Cassette = serde_yaml::from_str(&content).unwrap();

        assert_eq!(cassette.name, "test-recording");
        assert_eq!(cassette.request, "add a function");
        assert_eq!(cassette.interactions.len(), 3);
        assert_eq!(cassette.interactions[0].seq, 0);
        assert_eq!(cassette.interactions[2].seq, 2);
        assert_eq!(cassette.interactions[1].port, "knowledge");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn recorded_errors_survive_the_round_trip() {
        let dir = std::env::temp_dir().join("foreman_cassette_err_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("errors.cassette.yaml");

        let mut recorder = CassetteRecorder::new(&path, "errors", "req");
        recorder.record("llm", "complete", json!({}), Outcome::Err("rate limited".into()));
        recorder.finish().unwrap();

        let cassette: Cassette =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(cassette.interactions[0].outcome, Outcome::Err("rate limited".into()));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
