use crate::bus::{is_nested, is_strictly_nested, BusGateway, ObjectTree};
use crate::error::Result;
use crate::gap::constants::{GATT_CHARACTERISTIC_INTERFACE, GATT_SERVICE_INTERFACE};
use crate::gap::types::DevicePath;
use crate::gatt::types::{CharacteristicRecord, ServiceRecord};
use log::trace;

/// Reads the GATT hierarchy of connected devices from the object tree
///
/// Every query takes a fresh snapshot; nothing is cached between calls.
pub struct GattTopology<'a, B: ?Sized> {
    bus: &'a B,
}

impl<'a, B: BusGateway + ?Sized> GattTopology<'a, B> {
    pub fn new(bus: &'a B) -> Self {
        Self { bus }
    }

    /// Services resolved below `device`, in path order
    pub fn services(&self, device: &DevicePath) -> Result<Vec<ServiceRecord>> {
        let objects = self.bus.managed_objects()?;
        let services: Vec<ServiceRecord> = objects
            .iter()
            .filter(|(path, _)| is_nested(path, device.as_str()))
            .filter_map(|(path, interfaces)| {
                interfaces
                    .get(GATT_SERVICE_INTERFACE)
                    .map(|props| ServiceRecord::from_properties(path, props))
            })
            .collect();

        trace!("{} exposes {} services", device, services.len());
        Ok(services)
    }

    /// Characteristics below `service_path`, excluding the service object itself
    pub fn characteristics(&self, service_path: &str) -> Result<Vec<CharacteristicRecord>> {
        let objects = self.bus.managed_objects()?;
        Ok(characteristics_under(&objects, service_path))
    }

    /// Every characteristic of every service of `device`
    pub fn device_characteristics(&self, device: &DevicePath) -> Result<Vec<CharacteristicRecord>> {
        let objects = self.bus.managed_objects()?;
        Ok(characteristics_under(&objects, device.as_str()))
    }
}

fn characteristics_under(objects: &ObjectTree, parent: &str) -> Vec<CharacteristicRecord> {
    objects
        .iter()
        .filter(|(path, _)| is_strictly_nested(path, parent))
        .filter_map(|(path, interfaces)| {
            interfaces
                .get(GATT_CHARACTERISTIC_INTERFACE)
                .map(|props| CharacteristicRecord::from_properties(path, props))
        })
        .collect()
}
