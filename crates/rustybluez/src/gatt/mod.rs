//! GATT (Generic Attribute Profile) client over the BlueZ object tree
//!
//! This module reads the service/characteristic hierarchy of connected
//! devices and performs value reads, writes, and notification setup.

pub mod constants;
pub mod io;
pub mod notify;
pub mod topology;
pub mod types;


pub use io::Characteristic;
pub use notify::{notified_value, NotificationCallback};
pub use topology::GattTopology;
pub use types::{CharacteristicFlags, CharacteristicRecord, ServiceRecord};
