//! # Device Factory
//!
//! Printer device factory module.
//!
//! Responsibilities:
//! - Create devices from `DeviceConfig`
//! - Keep registered devices in registration order (`DeviceRegistry`)
//! - Speak the Memobird open HTTP API
//! - Provide mock devices for tests

pub mod client;
pub mod encoding;
pub mod error;
pub mod factory;
pub mod memobird;
pub mod mock_device;

pub use client::DeviceFactory;
pub use contracts::{DeviceConfig, PrintDevice};
pub use error::{DeviceError, Result};
pub use factory::DeviceRegistry;
pub use memobird::{MemobirdDevice, MemobirdFactory};
pub use mock_device::{MockDevice, MockDeviceConfig, MockDeviceFactory};
