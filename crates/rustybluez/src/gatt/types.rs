//! Common types for GATT operations
//!
//! Services and characteristics as BlueZ exposes them: bus objects nested
//! under a device, identified by path and UUID string.

use crate::bus::PropertyMap;
use crate::gatt::constants::*;
use bitflags::bitflags;
use std::fmt;

/// A GATT service on a remote device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub path: String,
    pub uuid: String,
}

impl ServiceRecord {
    pub fn from_properties(path: &str, props: &PropertyMap) -> Self {
        Self {
            path: path.to_string(),
            uuid: uuid_of(props),
        }
    }
}

impl fmt::Display for ServiceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.uuid, self.path)
    }
}

/// A characteristic below a GATT service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicRecord {
    pub path: String,
    pub uuid: String,
    /// Flag strings as reported by the stack
    pub flags: Vec<String>,
}

impl CharacteristicRecord {
    pub fn from_properties(path: &str, props: &PropertyMap) -> Self {
        Self {
            path: path.to_string(),
            uuid: uuid_of(props),
            flags: props
                .get(PROP_FLAGS)
                .and_then(|v| v.as_str_list())
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        }
    }

    /// Typed view of the flag strings
    pub fn properties(&self) -> CharacteristicFlags {
        CharacteristicFlags::from_bluez(&self.flags)
    }
}

impl fmt::Display for CharacteristicRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) [{}]", self.uuid, self.path, self.flags.join(", "))
    }
}

fn uuid_of(props: &PropertyMap) -> String {
    props
        .get(PROP_UUID)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_default()
}

bitflags! {
    /// Characteristic properties as defined in the Bluetooth specification
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CharacteristicFlags: u16 {
        const BROADCAST = 0x0001;
        const READ = 0x0002;
        const WRITE_WITHOUT_RESPONSE = 0x0004;
        const WRITE = 0x0008;
        const NOTIFY = 0x0010;
        const INDICATE = 0x0020;
        const AUTHENTICATED_SIGNED_WRITES = 0x0040;
        const EXTENDED_PROPERTIES = 0x0080;
        const RELIABLE_WRITE = 0x0100;
        const WRITABLE_AUXILIARIES = 0x0200;
    }
}

impl CharacteristicFlags {
    /// Parse BlueZ flag strings; strings without a counterpart here
    /// (the encrypt/authorize family) are skipped
    pub fn from_bluez<S: AsRef<str>>(flags: &[S]) -> Self {
        flags
            .iter()
            .filter_map(|flag| Self::from_flag(flag.as_ref()))
            .fold(Self::empty(), |acc, flag| acc | flag)
    }

    fn from_flag(flag: &str) -> Option<Self> {
        Some(match flag {
            FLAG_BROADCAST => Self::BROADCAST,
            FLAG_READ => Self::READ,
            FLAG_WRITE_WITHOUT_RESPONSE => Self::WRITE_WITHOUT_RESPONSE,
            FLAG_WRITE => Self::WRITE,
            FLAG_NOTIFY => Self::NOTIFY,
            FLAG_INDICATE => Self::INDICATE,
            FLAG_AUTHENTICATED_SIGNED_WRITES => Self::AUTHENTICATED_SIGNED_WRITES,
            FLAG_EXTENDED_PROPERTIES => Self::EXTENDED_PROPERTIES,
            FLAG_RELIABLE_WRITE => Self::RELIABLE_WRITE,
            FLAG_WRITABLE_AUXILIARIES => Self::WRITABLE_AUXILIARIES,
            _ => return None,
        })
    }

    pub fn can_read(&self) -> bool {
        self.contains(Self::READ)
    }

    pub fn can_write(&self) -> bool {
        self.contains(Self::WRITE)
    }

    pub fn can_write_without_response(&self) -> bool {
        self.contains(Self::WRITE_WITHOUT_RESPONSE)
    }

    pub fn can_notify(&self) -> bool {
        self.contains(Self::NOTIFY)
    }

    pub fn can_indicate(&self) -> bool {
        self.contains(Self::INDICATE)
    }
}
