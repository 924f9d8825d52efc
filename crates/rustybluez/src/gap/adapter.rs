use crate::bus::{BusGateway, PropertyMap, Value};
use crate::error::{Error, Result};
use crate::gap::constants::*;
use crate::gap::types::DevicePath;
use log::{debug, error, info};

/// The local Bluetooth adapter
pub struct GapAdapter<'a, B: ?Sized> {
    bus: &'a B,
    path: &'a str,
}

impl<'a, B: BusGateway + ?Sized> GapAdapter<'a, B> {
    /// Finds the adapter object to use
    ///
    /// `preferred` wins if it exists on the bus; otherwise the first object
    /// exposing the adapter interface is used.
    pub fn locate(bus: &B, preferred: Option<&str>) -> Result<String> {
        let objects = bus.managed_objects().map_err(|e| {
            error!("Error finding adapter: {}", e);
            Error::NoAdapter
        })?;

        if let Some(preferred) = preferred {
            if objects.contains_key(preferred) {
                return Ok(preferred.to_string());
            }
            debug!("Preferred adapter {} not present", preferred);
        }

        objects
            .iter()
            .find(|(_, interfaces)| interfaces.contains_key(ADAPTER_INTERFACE))
            .map(|(path, _)| path.clone())
            .ok_or(Error::NoAdapter)
    }

    pub fn new(bus: &'a B, path: &'a str) -> Self {
        Self { bus, path }
    }

    pub fn path(&self) -> &str {
        self.path
    }

    /// Restricts discovery to devices advertising one of `uuids`
    pub fn set_discovery_filter(&self, uuids: &[&str]) -> Result<()> {
        let mut filter = PropertyMap::new();
        filter.insert(
            FILTER_UUIDS.to_string(),
            Value::StrList(uuids.iter().map(|u| u.to_string()).collect()),
        );

        self.bus.call(
            self.path,
            ADAPTER_INTERFACE,
            METHOD_SET_DISCOVERY_FILTER,
            vec![Value::Dict(filter)],
        )?;
        Ok(())
    }

    /// Starts device discovery, filtered by a service UUID when one is given
    pub fn start_discovery(&self, service_uuid: Option<&str>) -> Result<()> {
        if let Some(uuid) = service_uuid.filter(|u| !u.is_empty()) {
            self.set_discovery_filter(&[uuid])?;
        }

        self.bus
            .call(self.path, ADAPTER_INTERFACE, METHOD_START_DISCOVERY, Vec::new())?;
        info!("Discovery started on {}", self.path);
        Ok(())
    }

    /// Stops device discovery
    pub fn stop_discovery(&self) -> Result<()> {
        self.bus
            .call(self.path, ADAPTER_INTERFACE, METHOD_STOP_DISCOVERY, Vec::new())?;
        info!("Discovery stopped on {}", self.path);
        Ok(())
    }

    /// Forgets a device, dropping its pairing and cached state
    pub fn remove_device(&self, device: &DevicePath) -> Result<()> {
        self.bus.call(
            self.path,
            ADAPTER_INTERFACE,
            METHOD_REMOVE_DEVICE,
            vec![Value::ObjectPath(device.to_string())],
        )?;
        Ok(())
    }
}
