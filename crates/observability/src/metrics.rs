//! Relay 指标收集模块
//!
//! 基于 DeliveryOutcome 收集和统计投递、分块与聊天中继的运行指标。

use std::collections::BTreeMap;
use std::time::Duration;

use contracts::{ChunkPolicy, DeliveryOutcome};
use metrics::{counter, gauge, histogram};

/// 记录一次投递结果
///
/// 每次 Send 返回后调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_delivery;
///
/// let started = Instant::now();
/// let outcome = deliver(device, &text, &config).await;
/// record_delivery(&outcome, started.elapsed());
/// ```
pub fn record_delivery(outcome: &DeliveryOutcome, elapsed: Duration) {
    let device_id = outcome.device_id().unwrap_or("none").to_string();

    counter!(
        "memo_relay_deliveries_total",
        "device_id" => device_id.clone(),
        "outcome" => outcome.label()
    )
    .increment(1);

    if let DeliveryOutcome::Failed { error } = outcome {
        counter!(
            "memo_relay_delivery_failures_total",
            "device_id" => device_id.clone(),
            "kind" => error.kind()
        )
        .increment(1);
    }

    if outcome.device_id().is_some() {
        histogram!("memo_relay_delivery_duration_ms", "device_id" => device_id)
            .record(elapsed.as_secs_f64() * 1000.0);
    }
}

/// 记录一次分块刷新
pub fn record_chunk_flushed(policy: ChunkPolicy, lines: usize, sub_chunks: usize) {
    let policy = match policy {
        ChunkPolicy::Pipeline => "pipeline",
        ChunkPolicy::Concurrent => "concurrent",
    };
    counter!("memo_relay_chunks_flushed_total", "policy" => policy).increment(1);
    counter!("memo_relay_sub_chunks_dispatched_total", "policy" => policy)
        .increment(sub_chunks as u64);
    histogram!("memo_relay_chunk_lines", "policy" => policy).record(lines as f64);
}

/// 记录读取到 EOF 时被丢弃的尾部行
pub fn record_trailing_dropped(lines: usize) {
    counter!("memo_relay_trailing_lines_dropped_total").increment(lines as u64);
}

/// 记录已注册设备数
pub fn record_registered_devices(count: usize) {
    gauge!("memo_relay_registered_devices").set(count as f64);
}

/// 记录一条被转发打印的聊天消息
pub fn record_message_relayed(room: bool) {
    let scope = if room { "room" } else { "direct" };
    counter!("memo_relay_chat_messages_relayed_total", "scope" => scope).increment(1);
}

/// 记录一条被过滤掉的聊天消息
pub fn record_message_ignored() {
    counter!("memo_relay_chat_messages_ignored_total").increment(1);
}

/// 单设备投递统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceTally {
    pub succeeded: u64,
    pub failed: u64,
}

/// 投递指标聚合器
///
/// 在内存中聚合指标，便于运行结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DeliveryMetricsAggregator {
    /// 成功投递 (accepted + confirmed)
    pub succeeded: u64,

    /// 失败投递
    pub failed: u64,

    /// 空注册表下的空操作
    pub no_devices: u64,

    /// 各设备统计
    pub per_device: BTreeMap<String, DeviceTally>,

    /// 投递耗时统计 (毫秒)
    pub latency_stats: RunningStats,
}

impl DeliveryMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, outcome: &DeliveryOutcome, elapsed: Duration) {
        match outcome {
            DeliveryOutcome::NoDevices => {
                self.no_devices += 1;
                return;
            }
            DeliveryOutcome::Failed { .. } => self.failed += 1,
            DeliveryOutcome::Accepted { .. } | DeliveryOutcome::Confirmed { .. } => {
                self.succeeded += 1
            }
        }

        if let Some(device_id) = outcome.device_id() {
            let tally = self.per_device.entry(device_id.to_string()).or_default();
            if outcome.is_success() {
                tally.succeeded += 1;
            } else {
                tally.failed += 1;
            }
        }
        self.latency_stats.push(elapsed.as_secs_f64() * 1000.0);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> DeliverySummary {
        let attempted = self.succeeded + self.failed;
        DeliverySummary {
            succeeded: self.succeeded,
            failed: self.failed,
            no_devices: self.no_devices,
            failure_rate: if attempted > 0 {
                self.failed as f64 / attempted as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
            per_device: self.per_device.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 投递摘要
#[derive(Debug, Clone, Default)]
pub struct DeliverySummary {
    pub succeeded: u64,
    pub failed: u64,
    pub no_devices: u64,
    pub failure_rate: f64,
    pub latency_ms: StatsSummary,
    pub per_device: BTreeMap<String, DeviceTally>,
}

impl std::fmt::Display for DeliverySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Delivery Summary ===")?;
        writeln!(f, "Succeeded: {}", self.succeeded)?;
        writeln!(
            f,
            "Failed: {} ({:.2}%)",
            self.failed, self.failure_rate
        )?;
        if self.no_devices > 0 {
            writeln!(f, "Skipped (no devices): {}", self.no_devices)?;
        }
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;

        if !self.per_device.is_empty() {
            writeln!(f, "Per device:")?;
            for (device, tally) in &self.per_device {
                writeln!(
                    f,
                    "  {}: {} ok, {} failed",
                    device, tally.succeeded, tally.failed
                )?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DeliveryError, PrintJobId};

    fn accepted(device: &str) -> DeliveryOutcome {
        DeliveryOutcome::Accepted {
            device_id: device.to_string(),
            job: PrintJobId::new("1"),
        }
    }

    fn failed(device: &str) -> DeliveryOutcome {
        DeliveryOutcome::Failed {
            error: DeliveryError::Rejected {
                device_id: device.to_string(),
            },
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = DeliveryMetricsAggregator::new();
        let ms = Duration::from_millis(10);

        aggregator.update(&accepted("a"), ms);
        aggregator.update(&accepted("b"), ms);
        aggregator.update(&failed("a"), ms);
        aggregator.update(&DeliveryOutcome::NoDevices, ms);

        assert_eq!(aggregator.succeeded, 2);
        assert_eq!(aggregator.failed, 1);
        assert_eq!(aggregator.no_devices, 1);
        assert_eq!(
            aggregator.per_device.get("a"),
            Some(&DeviceTally {
                succeeded: 1,
                failed: 1
            })
        );
        assert_eq!(aggregator.latency_stats.count(), 3);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = DeliveryMetricsAggregator::new();
        aggregator.update(&accepted("bird-1"), Duration::from_millis(5));
        aggregator.update(&failed("bird-1"), Duration::from_millis(5));

        let output = aggregator.summary().to_string();
        assert!(output.contains("Succeeded: 1"), "got: {output}");
        assert!(output.contains("50.00%"), "got: {output}");
        assert!(output.contains("bird-1: 1 ok, 1 failed"), "got: {output}");
    }

    #[test]
    fn test_record_functions_without_recorder() {
        // 未安装 recorder 时应为空操作
        record_delivery(&accepted("a"), Duration::from_millis(1));
        record_chunk_flushed(ChunkPolicy::Concurrent, 4, 2);
        record_message_relayed(true);
        record_message_ignored();
    }
}
