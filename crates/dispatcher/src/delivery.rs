//! Send - deliver one text to one device
//!
//! Every fault is logged and folded into [`DeliveryOutcome::Failed`]; nothing
//! propagates to the caller.

use std::time::Duration;

use contracts::{
    DeliveryError, DeliveryMode, DeliveryOutcome, PrintConfig, PrintDevice, PrintJobId,
    PrintStatus,
};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, instrument, warn};

/// How a delivery is carried out
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub mode: DeliveryMode,
    /// Status polling interval (complete mode)
    pub poll_interval: Duration,
    /// Give up watching after this long (complete mode)
    pub timeout: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self::from(&PrintConfig::default())
    }
}

impl From<&PrintConfig> for DeliveryConfig {
    fn from(print: &PrintConfig) -> Self {
        Self {
            mode: print.delivery_mode,
            poll_interval: print.poll_interval(),
            timeout: print.timeout(),
        }
    }
}

/// Deliver `text` to `device`
///
/// - best-effort: success iff the device acknowledged the job
/// - complete: additionally watch the job until it reports printed
#[instrument(
    name = "deliver",
    skip(device, text, config),
    fields(device_id = %device.device_id(), mode = ?config.mode, lines = text.lines().count())
)]
pub async fn deliver<D: PrintDevice>(
    device: &D,
    text: &str,
    config: &DeliveryConfig,
) -> DeliveryOutcome {
    match try_deliver(device, text, config).await {
        Ok(outcome) => {
            info!(outcome = outcome.label(), "delivered");
            outcome
        }
        Err(error) => {
            error!(error = %error, kind = error.kind(), "delivery failed");
            DeliveryOutcome::Failed { error }
        }
    }
}

async fn try_deliver<D: PrintDevice>(
    device: &D,
    text: &str,
    config: &DeliveryConfig,
) -> Result<DeliveryOutcome, DeliveryError> {
    let device_id = device.device_id().to_string();

    device
        .init()
        .await
        .map_err(|e| DeliveryError::Init {
            device_id: device_id.clone(),
            message: e.to_string(),
        })?;

    let job = device
        .print_text(text)
        .await
        .map_err(|e| DeliveryError::Print {
            device_id: device_id.clone(),
            message: e.to_string(),
        })?
        .ok_or_else(|| DeliveryError::Rejected {
            device_id: device_id.clone(),
        })?;

    match config.mode {
        DeliveryMode::BestEffort => Ok(DeliveryOutcome::Accepted { device_id, job }),
        DeliveryMode::Complete => {
            watch_job(device, &job, config.poll_interval, config.timeout).await?;
            Ok(DeliveryOutcome::Confirmed { device_id, job })
        }
    }
}

/// Poll `job` every `poll_interval` until it reports printed or `timeout` elapses
///
/// Polls run on a fixed schedule counted from the call: `interval`,
/// `2 * interval`, ... A slow reply does not shift later polls; slots it
/// overran are skipped. A poll scheduled past the deadline is not made; one
/// started before it runs to completion, bounded by the device's own request
/// timeout. A failed status query is logged and the watch goes on.
///
/// # Errors
/// `Timeout` when the job is still not printed at the deadline. It carries
/// the last observed status and the last query error.
#[instrument(
    name = "watch_job",
    skip(device, job, poll_interval, timeout),
    fields(device_id = %device.device_id(), job = %job)
)]
pub async fn watch_job<D: PrintDevice>(
    device: &D,
    job: &PrintJobId,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<PrintStatus, DeliveryError> {
    let poll_interval = poll_interval.max(Duration::from_millis(1));
    let started = Instant::now();
    let deadline = started + timeout;
    let mut last_status: Option<i32> = None;
    let mut last_error: Option<String> = None;

    let timed_out = |last_status: Option<i32>, last_error: Option<String>| {
        let waited_ms = started.elapsed().as_millis() as u64;
        warn!(waited_ms, ?last_status, ?last_error, "job not printed before timeout");
        DeliveryError::Timeout {
            device_id: device.device_id().to_string(),
            job: job.clone(),
            waited_ms,
            last_status,
            last_error,
        }
    };

    let mut next_poll = started + poll_interval;
    loop {
        if next_poll > deadline {
            return Err(timed_out(last_status, last_error));
        }
        sleep_until(next_poll).await;

        match device.status(job).await {
            Ok(status) if status.is_printed() => {
                debug!(waited_ms = started.elapsed().as_millis() as u64, "job printed");
                return Ok(status);
            }
            Ok(status) => {
                debug!(status = status.0, "job not printed yet");
                last_status = Some(status.0);
            }
            Err(e) => {
                warn!(error = %e, "status query failed, still watching");
                last_error = Some(e.to_string());
            }
        }

        let now = Instant::now();
        while next_poll <= now {
            next_poll += poll_interval;
        }
    }
}
