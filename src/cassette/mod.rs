//! Record/replay infrastructure for port interactions.
//!
//! A cassette is a YAML file capturing every call made through the port
//! traits during a run. Replaying a cassette makes a full coordination run
//! deterministic without any network access, which is how the integration
//! tests drive the loop.

pub mod format;
pub mod recorder;
pub mod replayer;

pub use format::{Cassette, Interaction, Outcome};
pub use recorder::CassetteRecorder;
pub use replayer::CassetteReplayer;
