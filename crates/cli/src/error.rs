//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file given explicitly but missing
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration rejected by the loader
    #[error("Failed to load configuration from {path}: {message}")]
    ConfigLoad { path: String, message: String },

    /// Configuration validation error (after CLI overrides)
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Invalid interactive input
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn config_load(path: &Path, message: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
