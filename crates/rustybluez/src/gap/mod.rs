//! GAP (Generic Access Profile) over the BlueZ object tree
//!
//! This module covers the adapter, device discovery, and the connection
//! lifecycle of remote devices.

pub mod adapter;
pub mod connection;
pub mod constants;
pub mod directory;
pub mod types;


pub use adapter::GapAdapter;
pub use connection::{DisconnectCallback, RemoteDevice};
pub use constants::*;
pub use directory::DeviceDirectory;
pub use types::{DevicePath, DeviceRecord};
