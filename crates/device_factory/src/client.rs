//! Device factory abstraction
//!
//! Defines how a registration request turns into a device handle, supporting
//! the real Memobird client and mock devices behind the same registry.

use contracts::{DeviceConfig, PrintDevice};

use crate::error::Result;

/// Device factory trait
///
/// Implementations validate the backend specific parts of a [`DeviceConfig`]
/// (credentials, identifiers) and build the device. Generic identifying
/// checks are done by the registry before the factory is called.
pub trait DeviceFactory {
    /// Device type produced by this factory
    type Device: PrintDevice;

    /// Build a device handle
    ///
    /// # Errors
    /// `DeviceError::InvalidDeviceConfig` when a required field is absent
    fn create(&self, config: &DeviceConfig) -> Result<Self::Device>;
}
