//! Live adapters that talk to real external systems.

pub mod clock;
pub mod knowledge;
pub mod llm;

pub use clock::SystemClock;
pub use knowledge::LiveKnowledgeSource;
pub use llm::LiveCompletionClient;
