//! Per-device delivery metrics

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::DeliveryOutcome;

/// Metrics for a single device
#[derive(Debug, Default)]
pub struct DeviceMetrics {
    /// Dispatches routed to this device
    attempts: AtomicU64,
    /// Accepted or confirmed deliveries
    delivered: AtomicU64,
    /// Failed deliveries
    failed: AtomicU64,
}

impl DeviceMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn inc_attempts(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Count a finished delivery
    pub fn record(&self, outcome: &DeliveryOutcome) {
        if outcome.is_success() {
            self.delivered.fetch_add(1, Ordering::Relaxed);
        } else if outcome.is_failure() {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempts: self.attempts(),
            delivered: self.delivered(),
            failed: self.failed(),
        }
    }
}

/// Snapshot of device metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub attempts: u64,
    pub delivered: u64,
    pub failed: u64,
}
