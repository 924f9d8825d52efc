//! RustyBlueZ - BLE device and GATT session management over BlueZ
//!
//! This library drives the platform Bluetooth stack through its object bus:
//! it discovers peripherals, connects and disconnects them, walks their GATT
//! services and characteristics, reads and writes values, and keeps value
//! notification and disconnect subscriptions consistent as devices come and go.
//!
//! The bus itself is abstracted behind [`bus::BusGateway`]; with the default
//! `dbus` feature, [`bus::dbus::DbusGateway`] talks to BlueZ on the system bus.

pub mod bus;
pub mod config;
pub mod error;
pub mod gap;
pub mod gatt;
pub mod manager;

// Re-export common types for convenience
pub use bus::{BusError, BusGateway, SubscriptionId, Value};
#[cfg(feature = "dbus")]
pub use bus::dbus::DbusGateway;
pub use config::ManagerConfig;
pub use error::{Error, Result};
pub use gap::{DevicePath, DeviceRecord};
pub use gatt::{CharacteristicFlags, CharacteristicRecord, ServiceRecord};
pub use manager::BluetoothManager;
