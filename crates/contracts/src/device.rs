//! PrintDevice trait - printer capability surface
//!
//! A device is an opaque, registered printer handle. The relay only ever
//! initialises it, submits text and asks for the status of a submitted job.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Status code reported by a device once a job has physically printed
pub const PRINT_SUCCESS_FLAG: i32 = 1;

/// Identifier of a submitted print job (`printcontentid`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrintJobId(pub String);

impl PrintJobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrintJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job status as reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintStatus(pub i32);

impl PrintStatus {
    pub const PRINTED: PrintStatus = PrintStatus(PRINT_SUCCESS_FLAG);

    /// Whether the job has physically printed
    pub fn is_printed(self) -> bool {
        self.0 == PRINT_SUCCESS_FLAG
    }
}

/// Printer device trait
///
/// All device implementations must implement this trait.
#[trait_variant::make(PrintDevice: Send)]
pub trait LocalPrintDevice {
    /// Identifying token (used for logging/metrics)
    fn device_id(&self) -> &str;

    /// Handshake with the device
    ///
    /// Must be idempotent: repeated calls after a successful init are cheap no-ops.
    async fn init(&self) -> Result<(), ContractError>;

    /// Submit text for printing
    ///
    /// Returns the job identifier acknowledged by the device, or `None` when
    /// the device answered without acknowledging the job.
    async fn print_text(&self, text: &str) -> Result<Option<PrintJobId>, ContractError>;

    /// Query the current status of a submitted job (single request, no polling)
    async fn status(&self, job: &PrintJobId) -> Result<PrintStatus, ContractError>;
}
