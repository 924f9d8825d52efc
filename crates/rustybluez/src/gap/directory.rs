use crate::bus::BusGateway;
use crate::error::Result;
use crate::gap::constants::DEVICE_INTERFACE;
use crate::gap::types::{DevicePath, DeviceRecord};
use log::trace;

/// Remote devices known to the platform stack
pub struct DeviceDirectory<'a, B: ?Sized> {
    bus: &'a B,
    adapter_path: &'a str,
}

impl<'a, B: BusGateway + ?Sized> DeviceDirectory<'a, B> {
    pub fn new(bus: &'a B, adapter_path: &'a str) -> Self {
        Self { bus, adapter_path }
    }

    /// Object path of the device with `address`; never touches the bus
    pub fn device_path(&self, address: &str) -> DevicePath {
        DevicePath::new(self.adapter_path, address)
    }

    /// Snapshot every device object, keeping those advertising `service_uuid`
    /// when a non-empty one is given
    pub fn list_devices(&self, service_uuid: Option<&str>) -> Result<Vec<DeviceRecord>> {
        let filter = service_uuid.filter(|u| !u.is_empty());
        let objects = self.bus.managed_objects()?;

        let devices: Vec<DeviceRecord> = objects
            .values()
            .filter_map(|interfaces| interfaces.get(DEVICE_INTERFACE))
            .map(DeviceRecord::from_properties)
            .filter(|record| filter.map_or(true, |uuid| record.advertises(uuid)))
            .collect();

        trace!("Found {} devices", devices.len());
        Ok(devices)
    }

    /// Current record of the device with `address`, if the stack knows it
    pub fn device(&self, address: &str) -> Result<Option<DeviceRecord>> {
        let path = self.device_path(address);
        let objects = self.bus.managed_objects()?;

        Ok(objects
            .get(path.as_str())
            .and_then(|interfaces| interfaces.get(DEVICE_INTERFACE))
            .map(DeviceRecord::from_properties))
    }
}
