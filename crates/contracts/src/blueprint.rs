//! RelayBlueprint - Config Loader 输出
//!
//! 描述完整的中继配置：咕咕机开放平台凭据、聊天过滤、打印节奏、预注册设备。

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的中继配置蓝图
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RelayBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 开放平台设置
    #[serde(default)]
    pub memobird: MemobirdConfig,

    /// 聊天过滤设置
    #[serde(default)]
    pub chat: ChatConfig,

    /// 打印节奏与投递策略
    #[serde(default)]
    #[validate(nested)]
    pub print: PrintConfig,

    /// 预注册设备列表
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// Memobird open API settings shared by every registered device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemobirdConfig {
    /// Developer access key (`ak`)
    #[serde(default)]
    pub access_key: String,

    /// API root, endpoints are appended to it
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for MemobirdConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            api_base: default_api_base(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl MemobirdConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_api_base() -> String {
    "http://open.memobird.cn/home".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

/// 聊天过滤配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// true: 匹配群聊主题；false: 匹配私聊发送者名称
    #[serde(default = "default_room")]
    pub room: bool,

    /// 正则表达式 (群主题或联系人名称)
    #[serde(default)]
    pub pattern: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            room: default_room(),
            pattern: String::new(),
        }
    }
}

fn default_room() -> bool {
    true
}

/// 打印配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PrintConfig {
    /// 每个打印块的行数
    #[serde(default = "default_chunk_read_lines")]
    #[validate(range(min = 1, message = "chunk_read_lines must be >= 1"))]
    pub chunk_read_lines: usize,

    /// 每次冲刷后的冷却时间 (毫秒)，防止设备过热
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// 打印状态轮询间隔 (毫秒)
    #[serde(default = "default_poll_interval_ms")]
    #[validate(range(min = 1, message = "poll_interval_ms must be >= 1"))]
    pub poll_interval_ms: u64,

    /// 打印确认总超时 (毫秒)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// 分块策略
    #[serde(default)]
    pub chunk_policy: ChunkPolicy,

    /// 投递模式
    #[serde(default)]
    pub delivery_mode: DeliveryMode,

    /// 设备选择策略
    #[serde(default)]
    pub dispatch: DispatchStrategy,

    /// 文件结尾不足一块的剩余行
    #[serde(default)]
    pub trailing_lines: TrailingLines,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            chunk_read_lines: default_chunk_read_lines(),
            settle_delay_ms: default_settle_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
            chunk_policy: ChunkPolicy::default(),
            delivery_mode: DeliveryMode::default(),
            dispatch: DispatchStrategy::default(),
            trailing_lines: TrailingLines::default(),
        }
    }
}

impl PrintConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_chunk_read_lines() -> usize {
    40
}

fn default_settle_delay_ms() -> u64 {
    20_000
}

fn default_poll_interval_ms() -> u64 {
    20_000
}

fn default_timeout_ms() -> u64 {
    60_000
}

/// 分块策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkPolicy {
    /// 单缓冲区顺序冲刷
    #[default]
    Pipeline,
    /// 按设备数量切分并发冲刷
    Concurrent,
}

/// 投递模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMode {
    /// 只看打印调用是否返回确认
    #[default]
    BestEffort,
    /// 轮询打印状态直到成功或超时
    Complete,
}

/// 设备选择策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchStrategy {
    /// 按注册顺序轮流
    #[default]
    RoundRobin,
    /// 每次随机选择
    Random,
}

/// 结尾剩余行处理
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingLines {
    /// 丢弃 (记录告警)
    #[default]
    Drop,
    /// 按当前策略冲刷
    Flush,
}

/// 设备注册配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// 设备编号 (memobirdID)
    pub device_id: String,

    /// 用户唯一标识，缺省时自动生成
    #[serde(default)]
    pub user_identifying: Option<String>,
}

impl DeviceConfig {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            user_identifying: None,
        }
    }
}
