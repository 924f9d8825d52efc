use crate::bus::{BusGateway, SignalEvent, SubscriptionId, Value};
use crate::error::{Error, Result};
use crate::gap::constants::*;
use crate::gap::types::DevicePath;
use log::{debug, info, trace};
use std::thread;
use std::time::Duration;

/// Invoked once with the device path when a watched device drops its connection
pub type DisconnectCallback = Box<dyn FnOnce(&str) + Send>;

/// Connection lifecycle of one remote device
pub struct RemoteDevice<'a, B: ?Sized> {
    bus: &'a B,
    path: &'a DevicePath,
}

impl<'a, B: BusGateway + ?Sized> RemoteDevice<'a, B> {
    pub fn new(bus: &'a B, path: &'a DevicePath) -> Self {
        Self { bus, path }
    }

    pub fn path(&self) -> &DevicePath {
        self.path
    }

    /// Ask the stack to connect, then poll `Connected` until it reads true
    ///
    /// Sleeps `interval` before each of at most `attempts` polls. Returns
    /// `Ok(false)` when the budget runs out.
    pub fn connect(&self, interval: Duration, attempts: u32) -> Result<bool> {
        self.bus.call(
            self.path.as_str(),
            DEVICE_INTERFACE,
            METHOD_CONNECT,
            Vec::new(),
        )?;
        debug!("Connect issued to {}, waiting for confirmation", self.path);

        for attempt in 1..=attempts {
            thread::sleep(interval);
            match self.is_connected() {
                Ok(true) => {
                    info!("Connected to {} after {} polls", self.path, attempt);
                    return Ok(true);
                }
                Ok(false) => {}
                Err(e) => trace!("Poll {} of {} failed: {}", attempt, self.path, e),
            }
        }

        Ok(false)
    }

    pub fn disconnect(&self) -> Result<()> {
        self.bus.call(
            self.path.as_str(),
            DEVICE_INTERFACE,
            METHOD_DISCONNECT,
            Vec::new(),
        )?;
        info!("Disconnected from {}", self.path);
        Ok(())
    }

    /// Read the `Connected` property
    pub fn is_connected(&self) -> Result<bool> {
        let value = self
            .bus
            .get_property(self.path.as_str(), DEVICE_INTERFACE, PROP_CONNECTED)?;
        value.as_bool().ok_or_else(|| {
            Error::UnexpectedReply(format!("{} is not a boolean: {}", PROP_CONNECTED, value))
        })
    }

    pub fn set_trusted(&self, trusted: bool) -> Result<()> {
        self.bus.set_property(
            self.path.as_str(),
            DEVICE_INTERFACE,
            PROP_TRUSTED,
            Value::Bool(trusted),
        )?;
        Ok(())
    }

    /// Listen for property changes on the device object
    pub fn watch(&self) -> Result<SubscriptionId> {
        Ok(self
            .bus
            .subscribe(self.path.as_str(), PROPERTIES_INTERFACE, PROPERTIES_CHANGED)?)
    }
}

/// Whether `event` reports the device interface going to `Connected == false`
pub fn reports_disconnect(event: &SignalEvent) -> bool {
    event.interface == DEVICE_INTERFACE
        && event.changed.get(PROP_CONNECTED) == Some(&Value::Bool(false))
}
