use crate::bus::PropertyMap;
use crate::gap::constants::*;
use std::fmt;

/// Object path of a remote device below an adapter
///
/// Derived from the adapter path and the device address:
/// `AA:BB:CC:DD:EE:FF` on `/org/bluez/hci0` is
/// `/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DevicePath(String);

impl DevicePath {
    pub fn new(adapter_path: &str, address: &str) -> Self {
        Self(format!(
            "{}/{}{}",
            adapter_path,
            DEVICE_NODE_PREFIX,
            address.replace(':', "_")
        ))
    }

    /// Wrap a path that is already known to name a device
    pub fn from_path(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the colon-separated address from the last path segment
    pub fn address(&self) -> Option<String> {
        let node = self.0.rsplit('/').next()?;
        let raw = node.strip_prefix(DEVICE_NODE_PREFIX)?;
        Some(raw.replace('_', ":"))
    }

    /// Path of the adapter this device hangs off
    pub fn adapter_path(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(adapter, _)| adapter)
    }
}

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DevicePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A remote device as reported by the adapter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRecord {
    pub address: String,
    pub name: String,
    pub alias: String,
    pub paired: bool,
    pub connected: bool,
    pub trusted: bool,
    /// Advertised service UUIDs
    pub uuids: Vec<String>,
    pub rssi: i16,
}

impl DeviceRecord {
    /// Build a record from the device interface's properties; missing or
    /// mistyped properties keep their defaults
    pub fn from_properties(props: &PropertyMap) -> Self {
        let text = |name: &str| {
            props
                .get(name)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_default()
        };
        let flag = |name: &str| props.get(name).and_then(|v| v.as_bool()).unwrap_or(false);

        Self {
            address: text(PROP_ADDRESS),
            name: text(PROP_NAME),
            alias: text(PROP_ALIAS),
            paired: flag(PROP_PAIRED),
            connected: flag(PROP_CONNECTED),
            trusted: flag(PROP_TRUSTED),
            uuids: props
                .get(PROP_UUIDS)
                .and_then(|v| v.as_str_list())
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            rssi: props.get(PROP_RSSI).and_then(|v| v.as_i16()).unwrap_or(0),
        }
    }

    /// Whether the device advertises `uuid`
    pub fn advertises(&self, uuid: &str) -> bool {
        self.uuids.iter().any(|u| u == uuid)
    }

    /// Name for display: the name, else the alias, else the address
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.alias.is_empty() {
            &self.alias
        } else {
            &self.address
        }
    }
}
