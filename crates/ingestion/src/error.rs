//! Ingestion 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 打开输入失败
    #[error("failed to open '{path}': {source}")]
    Open {
        /// 文件路径
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 读取输入失败 (I/O 错误、非 UTF-8 内容)
    #[error("failed to read from '{source_name}': {source}")]
    Read {
        /// 源名称
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// 聊天过滤正则无法编译
    #[error("invalid chat pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// 聊天事件无法解析
    #[error("invalid chat event at line {line_no}: {message}")]
    InvalidEvent {
        /// 行号 (从 1 开始)
        line_no: u64,
        /// 错误消息
        message: String,
    },
}

impl IngestionError {
    pub fn open(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    pub fn read(source_name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Read {
            source_name: source_name.into(),
            source,
        }
    }
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        match &err {
            IngestionError::Open { path, .. } => ContractError::source_read(path, err.to_string()),
            IngestionError::Read { source_name, .. } => {
                ContractError::source_read(source_name, err.to_string())
            }
            IngestionError::InvalidPattern { .. } => {
                ContractError::config_validation("chat.pattern", err.to_string())
            }
            IngestionError::InvalidEvent { .. } => {
                ContractError::source_read("chat-events", err.to_string())
            }
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
