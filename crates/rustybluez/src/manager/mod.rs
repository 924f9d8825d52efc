//! Device and GATT session manager
//!
//! [`BluetoothManager`] is the caller-facing facade over the adapter, the
//! device directory, connection lifecycle, GATT topology, and characteristic
//! I/O. It owns the two subscription tables (value notifications keyed by
//! characteristic path, disconnect watches keyed by device path) and
//! dispatches bus signals to them in [`BluetoothManager::process_events`].
//!
//! Failures of individual operations are logged and reported as `false` or
//! an empty result, except where noted.

use crate::bus::{is_nested, BusGateway, Registry, SignalEvent, SubscriptionId};
use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::gap::connection::reports_disconnect;
use crate::gap::{DeviceDirectory, DevicePath, DeviceRecord, DisconnectCallback, GapAdapter, RemoteDevice};
use crate::gatt::{
    notified_value, Characteristic, CharacteristicRecord, GattTopology, NotificationCallback,
    ServiceRecord,
};
use log::{debug, error, info, warn};
use std::time::Duration;


/// Manages discovery, connections, and GATT sessions through a [`BusGateway`]
///
/// Every operation that changes subscription state takes `&mut self`; move the
/// manager to a worker thread or wrap it in a mutex to share it.
pub struct BluetoothManager<B: BusGateway> {
    bus: B,
    config: ManagerConfig,
    adapter_path: String,
    subscriptions: Registry<NotificationCallback>,
    watches: Registry<DisconnectCallback>,
}

impl<B: BusGateway> BluetoothManager<B> {
    /// Locate an adapter on `bus` and build a manager around it
    ///
    /// Fails with [`Error::NoAdapter`] when the bus exposes no adapter.
    pub fn new(bus: B, config: ManagerConfig) -> Result<Self> {
        let adapter_path = GapAdapter::locate(&bus, Some(&config.default_adapter_path))?;
        info!("Using adapter {}", adapter_path);

        Ok(Self {
            bus,
            config,
            adapter_path,
            subscriptions: Registry::new(),
            watches: Registry::new(),
        })
    }

    pub fn adapter_path(&self) -> &str {
        &self.adapter_path
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    fn adapter(&self) -> GapAdapter<'_, B> {
        GapAdapter::new(&self.bus, &self.adapter_path)
    }

    fn directory(&self) -> DeviceDirectory<'_, B> {
        DeviceDirectory::new(&self.bus, &self.adapter_path)
    }

    // Discovery

    /// Start discovery, restricted to devices advertising `service_uuid`
    /// when a non-empty one is given
    pub fn start_discovery(&self, service_uuid: Option<&str>) -> bool {
        match self.adapter().start_discovery(service_uuid) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to start discovery on {}: {}", self.adapter_path, e);
                false
            }
        }
    }

    /// Stop discovery; stopping when not discovering is not an error
    pub fn stop_discovery(&self) {
        if let Err(e) = self.adapter().stop_discovery() {
            debug!("Stop discovery on {}: {}", self.adapter_path, e);
        }
    }

    // Device directory

    pub fn list_devices(&self, service_uuid: Option<&str>) -> Vec<DeviceRecord> {
        self.directory().list_devices(service_uuid).unwrap_or_else(|e| {
            error!("Error listing devices: {}", e);
            Vec::new()
        })
    }

    /// Object path of the device with `address`
    pub fn device_path(&self, address: &str) -> DevicePath {
        self.directory().device_path(address)
    }

    pub fn device(&self, address: &str) -> Option<DeviceRecord> {
        self.directory().device(address).unwrap_or_else(|e| {
            error!("Error looking up {}: {}", address, e);
            None
        })
    }

    // Connection lifecycle

    /// Connect and wait for the stack to confirm the link
    ///
    /// Blocks for up to [`ManagerConfig::connect_timeout`]. A timeout is
    /// reported the same way as a failed request.
    pub fn connect(&self, address: &str) -> bool {
        let path = self.device_path(address);
        let result = RemoteDevice::new(&self.bus, &path).connect(
            self.config.connect_poll_interval,
            self.config.connect_poll_attempts,
        );

        match result {
            Ok(true) => true,
            Ok(false) => {
                warn!(
                    "{} did not connect within {:?}",
                    address,
                    self.config.connect_timeout()
                );
                false
            }
            Err(e) => {
                error!("Failed to connect to {}: {}", address, e);
                false
            }
        }
    }

    pub fn disconnect(&self, address: &str) -> bool {
        let path = self.device_path(address);
        match RemoteDevice::new(&self.bus, &path).disconnect() {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to disconnect from {}: {}", address, e);
                false
            }
        }
    }

    /// Make the stack forget the device
    pub fn remove(&self, address: &str) -> bool {
        let path = self.device_path(address);
        match self.adapter().remove_device(&path) {
            Ok(()) => {
                info!("Removed {}", path);
                true
            }
            Err(e) => {
                error!("Failed to remove {}: {}", address, e);
                false
            }
        }
    }

    pub fn is_connected(&self, address: &str) -> bool {
        let path = self.device_path(address);
        RemoteDevice::new(&self.bus, &path)
            .is_connected()
            .unwrap_or_else(|e| {
                debug!("Could not read connection state of {}: {}", address, e);
                false
            })
    }

    pub fn set_trusted(&self, address: &str, trusted: bool) -> Result<()> {
        let path = self.device_path(address);
        RemoteDevice::new(&self.bus, &path).set_trusted(trusted)
    }

    /// Call `on_disconnect` once when `device` reports losing its connection
    ///
    /// Replaces any watch already registered for `device`. The watch removes
    /// itself when it fires.
    pub fn register_disconnect_watch<F>(&mut self, device: &DevicePath, on_disconnect: F) -> bool
    where
        F: FnOnce(&str) + Send + 'static,
    {
        let subscription = match RemoteDevice::new(&self.bus, device).watch() {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to watch {} for disconnects: {}", device, e);
                return false;
            }
        };

        let previous = self
            .watches
            .insert(device.as_str(), subscription, Box::new(on_disconnect));
        if let Some(previous) = previous {
            self.release(previous.subscription);
        }
        debug!("Watching {} for disconnects", device);
        true
    }

    pub fn has_disconnect_watch(&self, device: &DevicePath) -> bool {
        self.watches.contains(device.as_str())
    }

    /// Drop every notification subscription below `device`
    ///
    /// A subscription belongs to `device` when its path equals the device path
    /// or continues it after a `/`; a path that merely shares the prefix, such
    /// as `.../dev_AA_BB_CC_DD_EE_FF0`, is kept. Notifications are not stopped
    /// on the stack side. The disconnect watch of `device`, if any, is left in
    /// place.
    pub fn cleanup_device(&mut self, device: &DevicePath) {
        let removed = self
            .subscriptions
            .remove_where(|path| is_nested(path, device.as_str()));

        for (path, entry) in removed {
            debug!("Dropping subscription on {}", path);
            self.release(entry.subscription);
        }
    }

    // GATT topology

    pub fn list_services(&self, address: &str) -> Vec<ServiceRecord> {
        let path = self.device_path(address);
        GattTopology::new(&self.bus)
            .services(&path)
            .unwrap_or_else(|e| {
                error!("Error listing services of {}: {}", address, e);
                Vec::new()
            })
    }

    pub fn list_characteristics(&self, service_path: &str) -> Vec<CharacteristicRecord> {
        GattTopology::new(&self.bus)
            .characteristics(service_path)
            .unwrap_or_else(|e| {
                error!("Error listing characteristics of {}: {}", service_path, e);
                Vec::new()
            })
    }

    // Characteristic I/O

    /// Read a characteristic value
    ///
    /// A failed read is an error, distinct from an empty value.
    pub fn read(&self, characteristic_path: &str) -> Result<Vec<u8>> {
        Characteristic::new(&self.bus, characteristic_path)
            .read()
            .map_err(|e| {
                error!("Failed to read {}: {}", characteristic_path, e);
                e
            })
    }

    pub fn write(&self, characteristic_path: &str, data: &[u8]) -> bool {
        match Characteristic::new(&self.bus, characteristic_path).write(data) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to write {}: {}", characteristic_path, e);
                false
            }
        }
    }

    /// Deliver every new value of the characteristic to `callback`
    ///
    /// Any earlier subscription on the same path is released first, so only
    /// the latest callback receives values.
    pub fn enable_notifications<F>(&mut self, characteristic_path: &str, callback: F) -> bool
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        self.release_subscription(characteristic_path);

        let characteristic = Characteristic::new(&self.bus, characteristic_path);
        let subscription = match characteristic.subscribe() {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to subscribe to {}: {}", characteristic_path, e);
                return false;
            }
        };
        self.subscriptions
            .insert(characteristic_path, subscription, Box::new(callback));

        if let Err(e) = characteristic.start_notify() {
            error!("Failed to start notifications on {}: {}", characteristic_path, e);
            self.release_subscription(characteristic_path);
            return false;
        }

        info!("Notifications enabled on {}", characteristic_path);
        true
    }

    /// Stop notifications and drop the subscription, whatever the stack says
    pub fn disable_notifications(&mut self, characteristic_path: &str) -> bool {
        let stopped = Characteristic::new(&self.bus, characteristic_path).stop_notify();
        self.release_subscription(characteristic_path);

        match stopped {
            Ok(()) => {
                info!("Notifications disabled on {}", characteristic_path);
                true
            }
            Err(e) => {
                warn!("Failed to stop notifications on {}: {}", characteristic_path, e);
                false
            }
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_subscribed(&self, characteristic_path: &str) -> bool {
        self.subscriptions.contains(characteristic_path)
    }

    /// Ask for a larger MTU on the link to `address`
    ///
    /// Best effort: when no notify-capable characteristic exists or the stack
    /// refuses, the MTU is left to automatic negotiation. Always returns `true`.
    pub fn request_mtu(&self, address: &str, mtu: u16) -> bool {
        match self.acquire_mtu(address, mtu) {
            Ok(negotiated) => info!("MTU for {} negotiated to {}", address, negotiated),
            Err(e) => warn!(
                "MTU request for {} failed ({}), relying on automatic negotiation",
                address, e
            ),
        }
        true
    }

    fn acquire_mtu(&self, address: &str, mtu: u16) -> Result<u16> {
        let device = self.device_path(address);
        let candidate = GattTopology::new(&self.bus)
            .device_characteristics(&device)?
            .into_iter()
            .find(|c| c.properties().can_notify())
            .ok_or_else(|| Error::NotFound(format!("notify characteristic on {}", device)))?;

        Characteristic::new(&self.bus, &candidate.path).acquire_notify(mtu)
    }

    // Event pump

    /// Pump the bus once and run the callbacks of delivered signals
    ///
    /// Returns the number of callbacks invoked. Waits at most `timeout` for
    /// traffic. A pump error is logged and counts as no callbacks; use
    /// [`try_process_events`](Self::try_process_events) to see it.
    pub fn process_events(&mut self, timeout: Duration) -> usize {
        self.try_process_events(timeout).unwrap_or_else(|e| {
            warn!("Error processing bus events: {}", e);
            0
        })
    }

    /// Like [`process_events`](Self::process_events), but reports a failed pump
    pub fn try_process_events(&mut self, timeout: Duration) -> Result<usize> {
        let events = self.bus.process(timeout)?;
        Ok(events
            .into_iter()
            .map(|event| self.dispatch(event))
            .sum())
    }

    fn dispatch(&mut self, event: SignalEvent) -> usize {
        if let Some(path) = self.subscriptions.path_of(event.subscription) {
            let path = path.to_string();
            return match (notified_value(&event), self.subscriptions.get_mut(&path)) {
                (Some(value), Some(entry)) => {
                    (entry.handler)(value);
                    1
                }
                _ => 0,
            };
        }

        if let Some(path) = self.watches.path_of(event.subscription) {
            if !reports_disconnect(&event) {
                return 0;
            }
            let path = path.to_string();
            if let Some(entry) = self.watches.remove(&path) {
                info!("{} disconnected", path);
                self.release(entry.subscription);
                (entry.handler)(&path);
                return 1;
            }
            return 0;
        }

        debug!("Ignoring signal for released subscription {}", event.subscription);
        0
    }

    fn release_subscription(&mut self, characteristic_path: &str) {
        if let Some(entry) = self.subscriptions.remove(characteristic_path) {
            self.release(entry.subscription);
        }
    }

    /// Drop a gateway subscription; the object may already be gone
    fn release(&self, subscription: SubscriptionId) {
        if let Err(e) = self.bus.unsubscribe(subscription) {
            debug!("Releasing subscription {}: {}", subscription, e);
        }
    }
}

impl<B: BusGateway> Drop for BluetoothManager<B> {
    fn drop(&mut self) {
        let entries = self.subscriptions.drain();
        for (_, entry) in entries {
            self.release(entry.subscription);
        }
        let watches = self.watches.drain();
        for (_, entry) in watches {
            self.release(entry.subscription);
        }
        self.stop_discovery();
    }
}
