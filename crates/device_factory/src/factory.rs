//! DeviceRegistry 核心实现
//!
//! 按注册顺序保存设备，只追加不删除。

use contracts::{DeviceConfig, PrintDevice};
use tracing::{info, instrument, warn};

use crate::client::DeviceFactory;
use crate::error::{DeviceError, Result};

/// 设备注册表
///
/// 设备在注册时创建，运行期间不会销毁；轮询下标依赖稳定的注册顺序。
#[derive(Debug)]
pub struct DeviceRegistry<D> {
    devices: Vec<D>,
}

impl<D> Default for DeviceRegistry<D> {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
        }
    }
}

impl<D: PrintDevice> DeviceRegistry<D> {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 通过工厂创建并注册设备
    ///
    /// # Errors
    /// device_id 为空白，或工厂拒绝该配置时返回 `InvalidDeviceConfig`
    #[instrument(
        name = "device_registry_register",
        skip(self, factory, config),
        fields(device_id = %config.device_id)
    )]
    pub fn register<F>(&mut self, factory: &F, config: &DeviceConfig) -> Result<&D>
    where
        F: DeviceFactory<Device = D>,
    {
        if config.device_id.trim().is_empty() {
            warn!("rejecting device registration without device_id");
            return Err(DeviceError::invalid_config(
                "device_id",
                "device_id cannot be empty",
            ));
        }

        let device = factory.create(config)?;
        self.devices.push(device);
        info!(count = self.devices.len(), "device registered");
        Ok(&self.devices[self.devices.len() - 1])
    }

    /// 批量注册 (配置文件中的 `[[devices]]`、CLI `--device`)
    ///
    /// 遇到第一个错误即停止，已注册的设备保留。
    pub fn register_all<'a, F>(
        &mut self,
        factory: &F,
        configs: impl IntoIterator<Item = &'a DeviceConfig>,
    ) -> Result<usize>
    where
        F: DeviceFactory<Device = D>,
    {
        let mut added = 0;
        for config in configs {
            self.register(factory, config)?;
            added += 1;
        }
        Ok(added)
    }

    /// 直接追加已构建的设备
    pub fn push(&mut self, device: D) {
        self.devices.push(device);
    }

    /// 按注册顺序列出所有设备
    pub fn list(&self) -> &[D] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&D> {
        self.devices.get(index)
    }

    /// 所有设备的 ID (注册顺序)
    pub fn device_ids(&self) -> Vec<String> {
        self.devices
            .iter()
            .map(|d| d.device_id().to_string())
            .collect()
    }
}

impl<D> FromIterator<D> for DeviceRegistry<D> {
    fn from_iter<T: IntoIterator<Item = D>>(iter: T) -> Self {
        Self {
            devices: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_device::{MockDevice, MockDeviceFactory};

    #[test]
    fn test_register_keeps_order() {
        let factory = MockDeviceFactory::default();
        let mut registry: DeviceRegistry<MockDevice> = DeviceRegistry::new();

        for id in ["a", "b", "c"] {
            registry.register(&factory, &DeviceConfig::new(id)).unwrap();
        }

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.device_ids(), vec!["a", "b", "c"]);
        assert_eq!(registry.get(1).unwrap().device_id(), "b");
    }

    #[test]
    fn test_register_blank_id_rejected() {
        let factory = MockDeviceFactory::default();
        let mut registry = DeviceRegistry::new();

        let err = registry
            .register(&factory, &DeviceConfig::new("  "))
            .unwrap_err();
        assert!(matches!(err, DeviceError::InvalidDeviceConfig { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_factory_rejection_leaves_registry_untouched() {
        let factory = MockDeviceFactory {
            reject_ids: vec!["bad".to_string()],
            ..Default::default()
        };
        let mut registry = DeviceRegistry::new();

        let configs = [DeviceConfig::new("ok"), DeviceConfig::new("bad")];
        let err = registry.register_all(&factory, &configs).unwrap_err();

        assert!(matches!(err, DeviceError::InvalidDeviceConfig { .. }));
        assert_eq!(registry.device_ids(), vec!["ok"]);
    }

    #[test]
    fn test_from_iter() {
        let registry: DeviceRegistry<MockDevice> =
            ["x", "y"].into_iter().map(MockDevice::new).collect();
        assert_eq!(registry.list().len(), 2);
    }
}
