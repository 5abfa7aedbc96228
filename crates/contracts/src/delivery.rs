//! Delivery outcome - typed result of handing one text to one device

use thiserror::Error;

use crate::PrintJobId;

/// Why a delivery did not succeed
///
/// Delivery faults never propagate as `Err`; they are carried inside
/// [`DeliveryOutcome::Failed`] after being logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Device handshake failed
    #[error("device '{device_id}' init failed: {message}")]
    Init { device_id: String, message: String },

    /// Print request failed
    #[error("device '{device_id}' print request failed: {message}")]
    Print { device_id: String, message: String },

    /// Device answered without acknowledging the job
    #[error("device '{device_id}' did not acknowledge the print job")]
    Rejected { device_id: String },

    /// Job did not report printed before the timeout
    ///
    /// Failed status queries do not end the watch; the last one is kept here.
    #[error(
        "device '{device_id}' job {job} not printed after {waited_ms}ms \
         (last status: {last_status:?}, last error: {last_error:?})"
    )]
    Timeout {
        device_id: String,
        job: PrintJobId,
        waited_ms: u64,
        last_status: Option<i32>,
        last_error: Option<String>,
    },
}

impl DeliveryError {
    pub fn device_id(&self) -> &str {
        match self {
            Self::Init { device_id, .. }
            | Self::Print { device_id, .. }
            | Self::Rejected { device_id }
            | Self::Timeout { device_id, .. } => device_id,
        }
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Print { .. } => "print",
            Self::Rejected { .. } => "rejected",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// Result of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Best-effort success: the device acknowledged the job, printing is
    /// not confirmed
    Accepted { device_id: String, job: PrintJobId },
    /// Complete-mode success: the device reported the job printed
    Confirmed { device_id: String, job: PrintJobId },
    /// Delivery failed, fault attached
    Failed { error: DeliveryError },
    /// Registry was empty, nothing happened
    NoDevices,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Accepted { .. } | Self::Confirmed { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Device the outcome refers to (`None` for `NoDevices`)
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Self::Accepted { device_id, .. } | Self::Confirmed { device_id, .. } => {
                Some(device_id)
            }
            Self::Failed { error } => Some(error.device_id()),
            Self::NoDevices => None,
        }
    }

    /// Metric/log label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => "accepted",
            Self::Confirmed { .. } => "confirmed",
            Self::Failed { .. } => "failed",
            Self::NoDevices => "no_devices",
        }
    }
}
