//! Mock 打印设备
//!
//! 用于单元测试和端到端测试，支持注入失败、无确认、状态序列和打印延迟。

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use contracts::{ContractError, DeviceConfig, PrintDevice, PrintJobId, PrintStatus};
use tracing::{debug, instrument};

use crate::client::DeviceFactory;
use crate::error::{DeviceError, Result};

/// Mock 设备行为配置
#[derive(Debug, Clone)]
pub struct MockDeviceConfig {
    /// init 返回错误
    pub fail_init: bool,
    /// print_text 返回错误
    pub fail_print: bool,
    /// print_text 是否返回 job id
    pub acknowledge: bool,
    /// status 依次返回的状态码，用尽后重复最后一个；为空时直接返回已打印
    pub statuses: Vec<i32>,
    /// status 返回错误
    pub fail_status: bool,
    /// 前 N 次 status 返回错误，之后按 `statuses` 正常返回
    pub fail_status_calls: u32,
    /// 每次 print_text 的模拟耗时
    pub print_latency: Option<Duration>,
    /// 每次 status 的模拟耗时
    pub status_latency: Option<Duration>,
}

impl Default for MockDeviceConfig {
    fn default() -> Self {
        Self {
            fail_init: false,
            fail_print: false,
            acknowledge: true,
            statuses: Vec::new(),
            fail_status: false,
            fail_status_calls: 0,
            print_latency: None,
            status_latency: None,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    init_calls: AtomicU32,
    status_calls: AtomicU32,
    next_job: AtomicU64,
    printed: Mutex<Vec<String>>,
}

/// Mock 打印设备
///
/// Clone 出来的句柄共享调用记录，测试可以在设备移交给注册表后继续观察。
#[derive(Debug, Clone)]
pub struct MockDevice {
    device_id: String,
    config: MockDeviceConfig,
    state: Arc<MockState>,
}

impl MockDevice {
    /// 创建默认行为的 mock 设备 (成功、确认、立即打印)
    pub fn new(device_id: impl Into<String>) -> Self {
        Self::with_config(device_id, MockDeviceConfig::default())
    }

    /// 使用配置创建 mock 设备
    pub fn with_config(device_id: impl Into<String>, config: MockDeviceConfig) -> Self {
        Self {
            device_id: device_id.into(),
            config,
            state: Arc::new(MockState::default()),
        }
    }

    /// 已成功提交的打印文本 (按提交顺序)
    pub fn printed(&self) -> Vec<String> {
        self.state
            .printed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn print_count(&self) -> usize {
        self.state
            .printed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn init_calls(&self) -> u32 {
        self.state.init_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> u32 {
        self.state.status_calls.load(Ordering::SeqCst)
    }

    fn next_status(&self, call: u32) -> PrintStatus {
        let statuses = &self.config.statuses;
        match statuses.get(call as usize).or_else(|| statuses.last()) {
            Some(code) => PrintStatus(*code),
            None => PrintStatus::PRINTED,
        }
    }
}

impl PrintDevice for MockDevice {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    #[instrument(name = "mock_device_init", skip(self), fields(device_id = %self.device_id))]
    async fn init(&self) -> std::result::Result<(), ContractError> {
        self.state.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_init {
            return Err(ContractError::device_init(
                &self.device_id,
                "mock: init failure injected",
            ));
        }
        Ok(())
    }

    #[instrument(name = "mock_device_print", skip(self, text), fields(device_id = %self.device_id))]
    async fn print_text(
        &self,
        text: &str,
    ) -> std::result::Result<Option<PrintJobId>, ContractError> {
        if let Some(latency) = self.config.print_latency {
            tokio::time::sleep(latency).await;
        }
        if self.config.fail_print {
            return Err(ContractError::device_request(
                &self.device_id,
                "mock: print failure injected",
            ));
        }

        self.state
            .printed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());

        if !self.config.acknowledge {
            debug!("mock: print accepted without acknowledgment");
            return Ok(None);
        }
        let job = self.state.next_job.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Some(PrintJobId::new(format!("{}-{job}", self.device_id))))
    }

    async fn status(&self, job: &PrintJobId) -> std::result::Result<PrintStatus, ContractError> {
        let call = self.state.status_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.config.status_latency {
            tokio::time::sleep(latency).await;
        }
        if self.config.fail_status || call < self.config.fail_status_calls {
            return Err(ContractError::device_request(
                &self.device_id,
                format!("mock: status failure injected for job {job}"),
            ));
        }
        let answered = call.saturating_sub(self.config.fail_status_calls);
        Ok(self.next_status(answered))
    }
}

/// Mock 设备工厂
#[derive(Debug, Default, Clone)]
pub struct MockDeviceFactory {
    /// 创建出的设备使用的行为配置
    pub device_config: MockDeviceConfig,
    /// 这些 device_id 会被拒绝注册
    pub reject_ids: Vec<String>,
}

impl DeviceFactory for MockDeviceFactory {
    type Device = MockDevice;

    fn create(&self, config: &DeviceConfig) -> Result<MockDevice> {
        if self.reject_ids.contains(&config.device_id) {
            return Err(DeviceError::invalid_config(
                "device_id",
                format!("mock: device '{}' rejected", config.device_id),
            ));
        }
        Ok(MockDevice::with_config(
            config.device_id.trim(),
            self.device_config.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_mock_prints_and_acks() {
        let device = MockDevice::new("bird");
        device.init().await.unwrap();
        let job = device.print_text("hello").await.unwrap().unwrap();
        assert_eq!(job.as_str(), "bird-1");
        assert!(device.status(&job).await.unwrap().is_printed());
        assert_eq!(device.printed(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_clone_shares_records() {
        let device = MockDevice::new("bird");
        let observer = device.clone();
        device.print_text("a").await.unwrap();
        device.print_text("b").await.unwrap();
        assert_eq!(observer.print_count(), 2);
    }

    #[tokio::test]
    async fn test_status_sequence_repeats_last() {
        let device = MockDevice::with_config(
            "bird",
            MockDeviceConfig {
                statuses: vec![0, 0, 1],
                ..Default::default()
            },
        );
        let job = PrintJobId::new("j");
        let seen: Vec<i32> = {
            let mut v = Vec::new();
            for _ in 0..4 {
                v.push(device.status(&job).await.unwrap().0);
            }
            v
        };
        assert_eq!(seen, vec![0, 0, 1, 1]);
        assert_eq!(device.status_calls(), 4);
    }

    #[tokio::test]
    async fn test_status_fails_first_calls_then_answers() {
        let device = MockDevice::with_config(
            "bird",
            MockDeviceConfig {
                statuses: vec![0, 1],
                fail_status_calls: 2,
                ..Default::default()
            },
        );
        let job = PrintJobId::new("j");
        assert!(device.status(&job).await.is_err());
        assert!(device.status(&job).await.is_err());
        assert_eq!(device.status(&job).await.unwrap().0, 0);
        assert_eq!(device.status(&job).await.unwrap().0, 1);
        assert_eq!(device.status_calls(), 4);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let device = MockDevice::with_config(
            "bird",
            MockDeviceConfig {
                fail_init: true,
                fail_print: true,
                ..Default::default()
            },
        );
        assert!(device.init().await.is_err());
        assert!(device.print_text("x").await.is_err());
        assert!(device.printed().is_empty());
        assert_eq!(device.init_calls(), 1);
    }

    #[tokio::test]
    async fn test_no_ack() {
        let device = MockDevice::with_config(
            "bird",
            MockDeviceConfig {
                acknowledge: false,
                ..Default::default()
            },
        );
        assert!(device.print_text("x").await.unwrap().is_none());
        assert_eq!(device.print_count(), 1);
    }
}
