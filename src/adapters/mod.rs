//! Port adapter implementations (live, replaying, recording).

pub mod live;
pub mod recording;
pub mod replaying;
