//! Chunker - 把行源切成打印块并交给 Dispatcher
//!
//! 两种策略：
//! - pipeline: 缓冲区满 `chunk_lines` 即整体发送一次
//! - concurrent: 缓冲区满 `chunk_lines * 设备数` 后切成子块并发发送
//!
//! 每次冲刷期间行源处于暂停状态，冲刷完成并冷却 `settle_delay` 后恢复。

use std::time::Duration;

use contracts::{ChunkPolicy, DeliveryOutcome, LineSource, PrintConfig, PrintDevice, TrailingLines};
use futures::future::join_all;
use ingestion::clean_line;
use tracing::{debug, info, instrument, warn};

use crate::dispatcher::Dispatcher;
use crate::error::{DispatcherError, Result};

/// Chunker 配置
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    pub policy: ChunkPolicy,
    /// 每块行数
    pub chunk_lines: usize,
    /// 每次冲刷后的冷却时间
    pub settle_delay: Duration,
    /// 跳过的原始行数 (含空行，从 0 计)
    pub start_line: usize,
    pub trailing: TrailingLines,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self::from_print(&PrintConfig::default(), 0)
    }
}

impl ChunkerConfig {
    pub fn from_print(print: &PrintConfig, start_line: usize) -> Self {
        Self {
            policy: print.chunk_policy,
            chunk_lines: print.chunk_read_lines,
            settle_delay: print.settle_delay(),
            start_line,
            trailing: print.trailing_lines,
        }
    }
}

/// 一次运行的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkReport {
    /// 从行源读到的原始行数
    pub lines_read: usize,
    /// `start_line` 之前被跳过的行
    pub lines_skipped: usize,
    /// 空白行
    pub blank_lines: usize,
    /// 进入缓冲区的行
    pub lines_queued: usize,
    pub chunks_flushed: usize,
    pub deliveries_succeeded: usize,
    pub deliveries_failed: usize,
    /// 结尾被丢弃的行
    pub trailing_dropped: usize,
}

impl ChunkReport {
    fn count(&mut self, outcomes: &[DeliveryOutcome]) {
        for outcome in outcomes {
            if outcome.is_success() {
                self.deliveries_succeeded += 1;
            } else if outcome.is_failure() {
                self.deliveries_failed += 1;
            }
        }
    }
}

/// Chunker
pub struct Chunker<'a, D> {
    dispatcher: &'a Dispatcher<D>,
    config: ChunkerConfig,
}

impl<'a, D: PrintDevice> Chunker<'a, D> {
    pub fn new(dispatcher: &'a Dispatcher<D>, config: ChunkerConfig) -> Self {
        Self { dispatcher, config }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// 触发冲刷的缓冲区行数
    ///
    /// concurrent 模式下没有设备时按 1 台计算。
    pub fn threshold(&self) -> usize {
        match self.config.policy {
            ChunkPolicy::Pipeline => self.config.chunk_lines,
            ChunkPolicy::Concurrent => {
                self.config.chunk_lines * self.dispatcher.device_count().max(1)
            }
        }
    }

    /// 读完整个行源
    ///
    /// # Errors
    /// - `InvalidChunkSize`: `chunk_lines` 为 0
    /// - 行源读取失败 (已发送的块不会回滚)
    #[instrument(
        name = "chunker_run",
        skip(self, source),
        fields(source = %source.name(), policy = ?self.config.policy)
    )]
    pub async fn run<S: LineSource>(&self, source: &mut S) -> Result<ChunkReport> {
        if self.config.chunk_lines == 0 {
            return Err(DispatcherError::InvalidChunkSize(0));
        }

        let threshold = self.threshold();
        let mut report = ChunkReport::default();
        let mut buffer: Vec<String> = Vec::with_capacity(threshold);

        info!(
            threshold,
            start_line = self.config.start_line,
            devices = self.dispatcher.device_count(),
            "chunker started"
        );

        while let Some(raw) = source.next_line().await? {
            report.lines_read += 1;
            if report.lines_read <= self.config.start_line {
                report.lines_skipped += 1;
                continue;
            }

            let Some(line) = clean_line(&raw) else {
                report.blank_lines += 1;
                continue;
            };
            buffer.push(line.to_string());
            report.lines_queued += 1;

            if buffer.len() >= threshold {
                source.pause();
                self.flush(&buffer, &mut report).await;
                tokio::time::sleep(self.config.settle_delay).await;
                buffer.clear();
                source.resume();
            }
        }

        if !buffer.is_empty() {
            match self.config.trailing {
                TrailingLines::Drop => {
                    warn!(lines = buffer.len(), "dropping trailing lines below chunk size");
                    report.trailing_dropped = buffer.len();
                    observability::record_trailing_dropped(buffer.len());
                }
                TrailingLines::Flush => {
                    debug!(lines = buffer.len(), "flushing trailing lines");
                    self.flush(&buffer, &mut report).await;
                }
            }
        }

        info!(
            lines_read = report.lines_read,
            chunks = report.chunks_flushed,
            succeeded = report.deliveries_succeeded,
            failed = report.deliveries_failed,
            "chunker finished"
        );
        Ok(report)
    }

    async fn flush(&self, buffer: &[String], report: &mut ChunkReport) {
        let outcomes = match self.config.policy {
            ChunkPolicy::Pipeline => vec![self.dispatcher.send(&buffer.join("\n")).await],
            ChunkPolicy::Concurrent => {
                let parts: Vec<String> = buffer
                    .chunks(self.config.chunk_lines)
                    .map(|part| part.join("\n"))
                    .collect();
                join_all(parts.iter().map(|text| self.dispatcher.send(text))).await
            }
        };

        report.chunks_flushed += 1;
        report.count(&outcomes);
        observability::record_chunk_flushed(self.config.policy, buffer.len(), outcomes.len());
        debug!(
            lines = buffer.len(),
            sub_chunks = outcomes.len(),
            "chunk flushed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::DeliveryConfig;
    use device_factory::{MockDevice, MockDeviceConfig};
    use ingestion::{MemoryLineSource, SourceEvent};

    fn setup(ids: &[&str]) -> (Dispatcher<MockDevice>, Vec<MockDevice>) {
        let devices: Vec<MockDevice> = ids.iter().map(|id| MockDevice::new(*id)).collect();
        let registry = devices.iter().cloned().collect();
        (Dispatcher::new(registry, DeliveryConfig::default()), devices)
    }

    fn config(policy: ChunkPolicy, chunk_lines: usize) -> ChunkerConfig {
        ChunkerConfig {
            policy,
            chunk_lines,
            settle_delay: Duration::from_secs(20),
            start_line: 0,
            trailing: TrailingLines::Drop,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pipeline_flushes_full_chunks_and_drops_tail() {
        let (dispatcher, devices) = setup(&["a", "b"]);
        let chunker = Chunker::new(&dispatcher, config(ChunkPolicy::Pipeline, 2));
        let mut source = MemoryLineSource::new(["l1", "  ", "l2", "l3", "l4", "l5"]);

        let report = chunker.run(&mut source).await.unwrap();

        assert_eq!(devices[0].printed(), vec!["l1\nl2"]);
        assert_eq!(devices[1].printed(), vec!["l3\nl4"]);
        assert_eq!(report.chunks_flushed, 2);
        assert_eq!(report.blank_lines, 1);
        assert_eq!(report.trailing_dropped, 1);
        assert_eq!(report.deliveries_succeeded, 2);
        assert_eq!(source.reads_while_paused(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_around_each_flush() {
        let (dispatcher, _) = setup(&["a"]);
        let chunker = Chunker::new(&dispatcher, config(ChunkPolicy::Pipeline, 2));
        let mut source = MemoryLineSource::new(["l1", "l2", "l3", "l4"]);

        let started = tokio::time::Instant::now();
        chunker.run(&mut source).await.unwrap();

        assert_eq!(
            source.events(),
            &[
                SourceEvent::Pause { after_lines: 2 },
                SourceEvent::Resume { after_lines: 2 },
                SourceEvent::Pause { after_lines: 4 },
                SourceEvent::Resume { after_lines: 4 },
            ]
        );
        // two settle delays
        assert_eq!(started.elapsed(), Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_splits_per_device() {
        let (dispatcher, devices) = setup(&["a", "b"]);
        let chunker = Chunker::new(&dispatcher, config(ChunkPolicy::Concurrent, 2));
        let mut source = MemoryLineSource::new(["l1", "l2", "l3", "l4", "l5"]);

        let report = chunker.run(&mut source).await.unwrap();

        assert_eq!(chunker.threshold(), 4);
        assert_eq!(devices[0].printed(), vec!["l1\nl2"]);
        assert_eq!(devices[1].printed(), vec!["l3\nl4"]);
        assert_eq!(report.chunks_flushed, 1);
        assert_eq!(report.deliveries_succeeded, 2);
        assert_eq!(report.trailing_dropped, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_line_skips_raw_lines() {
        let (dispatcher, devices) = setup(&["a"]);
        let mut cfg = config(ChunkPolicy::Pipeline, 2);
        cfg.start_line = 2;
        let chunker = Chunker::new(&dispatcher, cfg);
        let mut source = MemoryLineSource::new(["skip", "", "l1", "l2"]);

        let report = chunker.run(&mut source).await.unwrap();

        assert_eq!(report.lines_skipped, 2);
        assert_eq!(report.blank_lines, 0);
        assert_eq!(devices[0].printed(), vec!["l1\nl2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trailing_flush() {
        let (dispatcher, devices) = setup(&["a"]);
        let mut cfg = config(ChunkPolicy::Pipeline, 3);
        cfg.trailing = TrailingLines::Flush;
        let chunker = Chunker::new(&dispatcher, cfg);
        let mut source = MemoryLineSource::new(["l1", "l2"]);

        let report = chunker.run(&mut source).await.unwrap();

        assert_eq!(devices[0].printed(), vec!["l1\nl2"]);
        assert_eq!(report.trailing_dropped, 0);
        assert_eq!(report.chunks_flushed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_devices_uses_single_device_threshold() {
        let (dispatcher, _) = setup(&[]);
        let chunker = Chunker::new(&dispatcher, config(ChunkPolicy::Concurrent, 2));
        let mut source = MemoryLineSource::new(["l1", "l2", "l3"]);

        let report = chunker.run(&mut source).await.unwrap();

        assert_eq!(chunker.threshold(), 2);
        assert_eq!(report.chunks_flushed, 1);
        assert_eq!(report.deliveries_succeeded, 0);
        assert_eq!(report.deliveries_failed, 0);
        assert_eq!(dispatcher.dispatch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delivery_does_not_stop_run() {
        let bad = MockDevice::with_config(
            "bad",
            MockDeviceConfig {
                fail_print: true,
                ..Default::default()
            },
        );
        let good = MockDevice::new("good");
        let registry = [bad, good.clone()].into_iter().collect();
        let dispatcher = Dispatcher::new(registry, DeliveryConfig::default());
        let chunker = Chunker::new(&dispatcher, config(ChunkPolicy::Pipeline, 1));
        let mut source = MemoryLineSource::new(["l1", "l2"]);

        let report = chunker.run(&mut source).await.unwrap();

        assert_eq!(report.deliveries_failed, 1);
        assert_eq!(report.deliveries_succeeded, 1);
        assert_eq!(good.printed(), vec!["l2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_error_propagates() {
        let (dispatcher, _) = setup(&["a"]);
        let chunker = Chunker::new(&dispatcher, config(ChunkPolicy::Pipeline, 2));
        let mut source = MemoryLineSource::new(["l1", "l2", "l3"]).fail_after(1);

        let err = chunker.run(&mut source).await.unwrap_err();
        assert!(matches!(err, DispatcherError::Contract(_)));
    }

    #[tokio::test]
    async fn test_zero_chunk_size_rejected() {
        let (dispatcher, _) = setup(&["a"]);
        let chunker = Chunker::new(&dispatcher, config(ChunkPolicy::Pipeline, 0));
        let mut source = MemoryLineSource::new(["l1"]);

        assert!(matches!(
            chunker.run(&mut source).await,
            Err(DispatcherError::InvalidChunkSize(0))
        ));
    }
}
