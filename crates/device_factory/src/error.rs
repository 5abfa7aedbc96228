//! Device Factory error types

use contracts::ContractError;
use thiserror::Error;

/// Device Factory specific error
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Registration rejected
    #[error("invalid device config at '{field}': {message}")]
    InvalidDeviceConfig { field: String, message: String },

    /// HTTP transport error
    #[error("device '{device_id}' http error on '{endpoint}': {message}")]
    Http {
        device_id: String,
        endpoint: &'static str,
        message: String,
    },

    /// API answered with a non-success result code
    #[error("device '{device_id}' api error on '{endpoint}': code={code} {message}")]
    Api {
        device_id: String,
        endpoint: &'static str,
        code: i64,
        message: String,
    },

    /// API answered with something we cannot interpret
    #[error("device '{device_id}' malformed response on '{endpoint}': {message}")]
    MalformedResponse {
        device_id: String,
        endpoint: &'static str,
        message: String,
    },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl DeviceError {
    /// Create invalid device config error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDeviceConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Convert into the contract error reported by a device handshake
    pub fn into_init_error(self, device_id: &str) -> ContractError {
        match self {
            Self::Contract(e) => e,
            other => ContractError::device_init(device_id, other.to_string()),
        }
    }
}

impl From<DeviceError> for ContractError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::InvalidDeviceConfig { field, message } => {
                ContractError::InvalidDeviceConfig { field, message }
            }
            DeviceError::Http { ref device_id, .. }
            | DeviceError::Api { ref device_id, .. }
            | DeviceError::MalformedResponse { ref device_id, .. } => {
                ContractError::device_request(device_id.clone(), err.to_string())
            }
            DeviceError::Contract(e) => e,
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, DeviceError>;
