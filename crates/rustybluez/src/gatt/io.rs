//! Value access on a single characteristic

use crate::bus::{BusGateway, PropertyMap, SubscriptionId, Value};
use crate::error::{Error, Result};
use crate::gap::constants::{GATT_CHARACTERISTIC_INTERFACE, PROPERTIES_CHANGED, PROPERTIES_INTERFACE};
use crate::gatt::constants::*;
use log::debug;

/// A characteristic object on the bus
pub struct Characteristic<'a, B: ?Sized> {
    bus: &'a B,
    path: &'a str,
}

impl<'a, B: BusGateway + ?Sized> Characteristic<'a, B> {
    pub fn new(bus: &'a B, path: &'a str) -> Self {
        Self { bus, path }
    }

    pub fn path(&self) -> &str {
        self.path
    }

    /// Read the current value
    pub fn read(&self) -> Result<Vec<u8>> {
        let reply = self.invoke(METHOD_READ_VALUE, vec![Value::Dict(PropertyMap::new())])?;
        match reply.into_iter().next() {
            Some(Value::Bytes(bytes)) => {
                debug!("Read {} bytes from {}", bytes.len(), self.path);
                Ok(bytes)
            }
            Some(other) => Err(Error::UnexpectedReply(format!(
                "{} returned {}",
                METHOD_READ_VALUE, other
            ))),
            None => Err(Error::UnexpectedReply(format!(
                "{} returned nothing",
                METHOD_READ_VALUE
            ))),
        }
    }

    /// Write `data` with the stack's default (acknowledged) write type
    pub fn write(&self, data: &[u8]) -> Result<()> {
        self.invoke(
            METHOD_WRITE_VALUE,
            vec![Value::Bytes(data.to_vec()), Value::Dict(PropertyMap::new())],
        )?;
        debug!("Wrote 0x{} to {}", hex::encode(data), self.path);
        Ok(())
    }

    pub fn start_notify(&self) -> Result<()> {
        self.invoke(METHOD_START_NOTIFY, Vec::new()).map(|_| ())
    }

    pub fn stop_notify(&self) -> Result<()> {
        self.invoke(METHOD_STOP_NOTIFY, Vec::new()).map(|_| ())
    }

    /// Acquire a notification stream, proposing `mtu`; returns the MTU the
    /// stack settled on
    ///
    /// The stream handle in the reply is dropped, which closes it again.
    pub fn acquire_notify(&self, mtu: u16) -> Result<u16> {
        let mut options = PropertyMap::new();
        options.insert(OPTION_MTU.to_string(), Value::UInt16(mtu));

        let reply = self.invoke(METHOD_ACQUIRE_NOTIFY, vec![Value::Dict(options)])?;
        reply.get(1).and_then(Value::as_u16).ok_or_else(|| {
            Error::UnexpectedReply(format!("{} reply carries no MTU", METHOD_ACQUIRE_NOTIFY))
        })
    }

    /// Listen for property changes on the characteristic object
    pub fn subscribe(&self) -> Result<SubscriptionId> {
        Ok(self
            .bus
            .subscribe(self.path, PROPERTIES_INTERFACE, PROPERTIES_CHANGED)?)
    }

    fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Vec<Value>> {
        Ok(self
            .bus
            .call(self.path, GATT_CHARACTERISTIC_INTERFACE, method, args)?)
    }
}
