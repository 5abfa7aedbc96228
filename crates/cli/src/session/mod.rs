//! Relay session - devices, dispatcher and the runs on top of them.

mod orchestrator;
mod stats;

pub use orchestrator::Session;
pub use stats::{write_chunk_report, write_relay_stats, SessionStats};
