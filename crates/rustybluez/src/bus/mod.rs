//! Object bus abstraction
//!
//! The manager never talks to a bus connection directly. Everything it needs
//! from the platform stack goes through the [`BusGateway`] trait: object
//! enumeration, method calls, property access, and property-change signal
//! subscriptions that are delivered when the caller pumps [`BusGateway::process`].

#[cfg(feature = "dbus")]
pub mod dbus;
pub mod registry;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

#[cfg(test)]
mod tests;

pub use registry::Registry;
pub use types::{InterfaceMap, ObjectTree, PropertyMap, SignalEvent, SubscriptionId, Value};

use std::time::Duration;
use thiserror::Error;

/// Errors reported by a bus gateway
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BusError {
    #[error("{name}: {message}")]
    Call { name: String, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown subscription {0}")]
    UnknownSubscription(SubscriptionId),
}

/// Capabilities the manager consumes from the system bus
///
/// Every operation may fail independently of program logic. Signal handlers
/// are not stored here: a subscription only yields a [`SubscriptionId`], and
/// matching signals come back as [`SignalEvent`]s from [`process`](Self::process).
pub trait BusGateway {
    /// Enumerate every managed object below `/` with its interfaces and properties
    fn managed_objects(&self) -> Result<ObjectTree, BusError>;

    /// Invoke `method` on `interface` of the object at `path`
    fn call(
        &self,
        path: &str,
        interface: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Vec<Value>, BusError>;

    /// Read one property
    fn get_property(&self, path: &str, interface: &str, name: &str) -> Result<Value, BusError>;

    /// Write one property
    fn set_property(
        &self,
        path: &str,
        interface: &str,
        name: &str,
        value: Value,
    ) -> Result<(), BusError>;

    /// Start listening for signal `member` of `interface` emitted by the object at `path`
    fn subscribe(
        &self,
        path: &str,
        interface: &str,
        member: &str,
    ) -> Result<SubscriptionId, BusError>;

    /// Stop listening; signals already queued for `id` may still be delivered
    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), BusError>;

    /// Handle pending bus traffic, waiting at most `timeout`, and return the
    /// signals matched against live subscriptions
    fn process(&self, timeout: Duration) -> Result<Vec<SignalEvent>, BusError>;
}

/// Whether `path` is `parent` itself or lies below it in the object tree
pub fn is_nested(path: &str, parent: &str) -> bool {
    match path.strip_prefix(parent) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || parent.ends_with('/'),
        None => false,
    }
}

/// Whether `path` lies below `parent` and is not `parent` itself
pub fn is_strictly_nested(path: &str, parent: &str) -> bool {
    path != parent && is_nested(path, parent)
}
