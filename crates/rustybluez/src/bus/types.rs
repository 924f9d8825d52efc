//! Value types exchanged with a bus gateway

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Properties of one interface, keyed by property name
pub type PropertyMap = HashMap<String, Value>;

/// Interfaces exposed by one object, keyed by interface name
pub type InterfaceMap = HashMap<String, PropertyMap>;

/// Snapshot of every managed object, ordered by object path
pub type ObjectTree = BTreeMap<String, InterfaceMap>;

/// A typed value read from or sent to the bus
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int16(i16),
    UInt16(u16),
    UInt32(u32),
    Str(String),
    ObjectPath(String),
    Bytes(Vec<u8>),
    StrList(Vec<String>),
    Dict(PropertyMap),
    /// A payload the manager never inspects, kept as its type signature
    Other(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Value::Int16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Value::UInt16(v) => Some(*v),
            _ => None,
        }
    }

    /// String contents of a `Str` or `ObjectPath`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::ObjectPath(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str_list(&self) -> Option<&[String]> {
        match self {
            Value::StrList(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&PropertyMap> {
        match self {
            Value::Dict(map) => Some(map),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Int16(value)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::UInt16(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::StrList(value)
    }
}

impl From<PropertyMap> for Value {
    fn from(value: PropertyMap) -> Self {
        Value::Dict(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int16(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::ObjectPath(p) => write!(f, "{}", p),
            Value::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Value::StrList(list) => write!(f, "[{}]", list.join(", ")),
            Value::Dict(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, map[key])?;
                }
                write!(f, "}}")
            }
            Value::Other(signature) => write!(f, "<{}>", signature),
        }
    }
}

/// Identifies one live signal subscription held by a gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A property-change signal delivered for a subscription
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    /// Subscription the signal was matched against
    pub subscription: SubscriptionId,
    /// Interface whose properties changed
    pub interface: String,
    /// Changed properties with their new values
    pub changed: PropertyMap,
    /// Properties whose values were invalidated without being sent
    pub invalidated: Vec<String>,
}
