//! # Dispatcher
//!
//! 打印分发模块。
//!
//! 负责：
//! - 在已注册设备间轮询 (或随机) 选择设备
//! - 单次投递：best-effort 确认 / complete 轮询打印状态
//! - 把文件切块发送 (pipeline / concurrent)，冲刷期间暂停行源
//! - 把聊天消息渲染后转发给设备
//!
//! 投递失败只记录日志并折叠进 `DeliveryOutcome::Failed`，不会中断上游。

pub mod chunker;
pub mod delivery;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod relay;

pub use chunker::{ChunkReport, Chunker, ChunkerConfig};
pub use contracts::{DeliveryError, DeliveryOutcome};
pub use delivery::{deliver, watch_job, DeliveryConfig};
pub use dispatcher::Dispatcher;
pub use error::{DispatcherError, Result};
pub use metrics::{DeviceMetrics, MetricsSnapshot};
pub use relay::{ChatRelay, RelayStats};
