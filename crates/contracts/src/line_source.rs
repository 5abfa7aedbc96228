//! LineSource trait - line-oriented ingestion with explicit backpressure
//!
//! Consumers call [`LocalLineSource::pause`] before a blocking flush and
//! [`LocalLineSource::resume`] afterwards. A paused source must stop reading
//! from its underlying input until resumed; lines already buffered may still
//! be handed out.

use crate::ContractError;

/// Line source trait
#[trait_variant::make(LineSource: Send)]
pub trait LocalLineSource {
    /// Source name (used for logging)
    fn name(&self) -> &str;

    /// Next raw line, `Ok(None)` once the source is exhausted
    ///
    /// # Errors
    /// Returns read errors of the underlying input
    async fn next_line(&mut self) -> Result<Option<String>, ContractError>;

    /// Halt reading further input
    fn pause(&mut self);

    /// Continue reading input
    fn resume(&mut self);

    /// Check if currently paused
    fn is_paused(&self) -> bool;
}
