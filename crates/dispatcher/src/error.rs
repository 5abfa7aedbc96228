//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Delivery faults are not errors here: they end up in
/// `DeliveryOutcome::Failed`. Only source faults and bad setup propagate.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Chunk size must be at least one line
    #[error("chunk_read_lines must be >= 1, got {0}")]
    InvalidChunkSize(usize),

    /// Chat relay cannot run without a filter pattern
    #[error("chat pattern is empty; set [chat].pattern")]
    MissingChatPattern,

    /// Line source fault (from contract)
    #[error("source error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// Ingestion fault
    #[error(transparent)]
    Ingestion(#[from] ingestion::IngestionError),

    /// Device registration fault
    #[error(transparent)]
    Device(#[from] device_factory::DeviceError),
}

pub type Result<T> = std::result::Result<T, DispatcherError>;
