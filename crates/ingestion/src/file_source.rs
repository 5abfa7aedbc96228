//! 文件行源
//!
//! 后台读取任务逐行读取输入，通过有界 async-channel 交给消费者。
//! 暂停期间读取任务停止读取底层输入，直到 resume。
//! 非 UTF-8 的行 (例如 GBK 文本) 按有损方式解码并继续读取。

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender};
use contracts::{ContractError, LineSource};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::{IngestionMetrics, LineSourceConfig};
use crate::error::{IngestionError, Result};

/// 文件行源
pub struct FileLineSource {
    name: String,
    rx: Receiver<Result<String>>,
    pause_tx: watch::Sender<bool>,
    paused: bool,
    reader: JoinHandle<()>,
    metrics: Arc<IngestionMetrics>,
}

impl FileLineSource {
    /// 打开文件并启动读取任务
    ///
    /// # Errors
    /// 文件不存在或无法打开时返回 `IngestionError::Open`
    #[instrument(
        name = "file_line_source_open",
        skip(path, config),
        fields(path = %path.as_ref().display())
    )]
    pub async fn open(path: impl AsRef<Path>, config: LineSourceConfig) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path)
            .await
            .map_err(|e| IngestionError::open(&name, e))?;
        info!("file opened for line reading");
        Ok(Self::from_reader(name, file, config))
    }

    /// 从任意异步输入创建行源 (stdin、内存缓冲等)
    ///
    /// 必须在 tokio runtime 内调用。
    pub fn from_reader<R>(name: impl Into<String>, reader: R, config: LineSourceConfig) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let name = name.into();
        let (tx, rx) = bounded(config.channel_capacity.max(1));
        let (pause_tx, pause_rx) = watch::channel(false);
        let metrics = Arc::new(IngestionMetrics::new());

        let reader = tokio::spawn(read_loop(
            name.clone(),
            BufReader::new(reader),
            tx,
            pause_rx,
            metrics.clone(),
        ));

        Self {
            name,
            rx,
            pause_tx,
            paused: false,
            reader,
            metrics,
        }
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }
}

/// 去掉行尾的 `\n` / `\r\n`
fn trim_line_end(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

async fn read_loop<R>(
    name: String,
    mut reader: BufReader<R>,
    tx: Sender<Result<String>>,
    mut pause_rx: watch::Receiver<bool>,
    metrics: Arc<IngestionMetrics>,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut line_no: u64 = 0;
    loop {
        // 暂停时阻塞在这里；发送端被 drop 说明行源已释放
        if pause_rx.wait_for(|paused| !*paused).await.is_err() {
            return;
        }

        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                debug!(source = %name, "end of input");
                return;
            }
            Ok(_) => {
                line_no += 1;
                metrics.record_line();
                let line = match String::from_utf8_lossy(trim_line_end(&buf)) {
                    Cow::Borrowed(line) => line.to_string(),
                    Cow::Owned(line) => {
                        metrics.record_lossy_line();
                        warn!(
                            source = %name,
                            line = line_no,
                            "line is not valid UTF-8, decoded lossily"
                        );
                        line
                    }
                };
                if tx.send(Ok(line)).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                metrics.record_error();
                warn!(source = %name, error = %e, "read failed");
                let _ = tx.send(Err(IngestionError::read(&name, e))).await;
                return;
            }
        }
    }
}

impl LineSource for FileLineSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_line(&mut self) -> std::result::Result<Option<String>, ContractError> {
        match self.rx.recv().await {
            Ok(Ok(line)) => Ok(Some(line)),
            Ok(Err(e)) => Err(e.into()),
            // 读取任务结束且缓冲已读完
            Err(_) => Ok(None),
        }
    }

    fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.metrics.record_pause();
            self.pause_tx.send_replace(true);
            debug!(source = %self.name, "paused");
        }
    }

    fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.pause_tx.send_replace(false);
            debug!(source = %self.name, "resumed");
        }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Drop for FileLineSource {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
