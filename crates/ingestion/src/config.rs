//! Line source configuration and metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Line source configuration
#[derive(Debug, Clone)]
pub struct LineSourceConfig {
    /// Read-ahead channel capacity (lines buffered between reader task and consumer)
    pub channel_capacity: usize,
}

impl Default for LineSourceConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

impl LineSourceConfig {
    /// Create new line source configuration
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            channel_capacity: channel_capacity.max(1),
        }
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Raw lines read from the input
    pub lines_read: AtomicU64,

    /// Read errors
    pub read_errors: AtomicU64,

    /// Lines that were not valid UTF-8 and were decoded lossily
    pub lossy_lines: AtomicU64,

    /// Pause requests
    pub pauses: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_line(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lossy_line(&self) {
        self.lossy_lines.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pause(&self) {
        self.pauses.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            lossy_lines: self.lossy_lines.load(Ordering::Relaxed),
            pauses: self.pauses.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub lines_read: u64,
    pub read_errors: u64,
    pub lossy_lines: u64,
    pub pauses: u64,
}
