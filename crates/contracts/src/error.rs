//! Layered error definitions
//!
//! Categorized by source: config / device / ingestion / chat

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Device Errors =====
    /// Device registration rejected (missing identifying fields)
    #[error("invalid device config at '{field}': {message}")]
    InvalidDeviceConfig { field: String, message: String },

    /// Device handshake failed
    #[error("device '{device_id}' init error: {message}")]
    DeviceInit { device_id: String, message: String },

    /// Device request failed (transport or API level)
    #[error("device '{device_id}' request error: {message}")]
    DeviceRequest { device_id: String, message: String },

    // ===== Ingestion Errors =====
    /// Line source read error
    #[error("source '{source_name}' read error: {message}")]
    SourceRead {
        source_name: String,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid device config error
    pub fn invalid_device(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDeviceConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create device init error
    pub fn device_init(device_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DeviceInit {
            device_id: device_id.into(),
            message: message.into(),
        }
    }

    /// Create device request error
    pub fn device_request(device_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DeviceRequest {
            device_id: device_id.into(),
            message: message.into(),
        }
    }

    /// Create source read error
    pub fn source_read(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceRead {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
