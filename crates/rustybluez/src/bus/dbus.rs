//! [`BusGateway`] over a blocking libdbus system-bus connection
//!
//! Subscriptions are match rules. Their handlers run inside
//! `Connection::process` and only queue a [`SignalEvent`] on a channel, which
//! [`DbusGateway::process`] drains for the caller to dispatch.

use super::{BusError, BusGateway, ObjectTree, PropertyMap, SignalEvent, SubscriptionId, Value};
use crate::gap::constants::{BLUEZ_SERVICE, PROPERTIES_INTERFACE};
use dbus::arg::{ArgType, IterAppend, PropMap, RefArg, Variant};
use dbus::blocking::stdintf::org_freedesktop_dbus::{ObjectManager, PropertiesPropertiesChanged};
use dbus::blocking::{BlockingSender, Connection};
use dbus::channel::Token;
use dbus::message::MatchRule;
use dbus::strings::{BusName, Interface, Member};
use dbus::{Message, Path};
use log::{debug, trace};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

#[cfg(test)]
mod tests;

/// Default timeout for a single method call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(25);

impl From<dbus::Error> for BusError {
    fn from(err: dbus::Error) -> Self {
        BusError::Call {
            name: err.name().unwrap_or("org.freedesktop.DBus.Error.Failed").to_string(),
            message: err.message().unwrap_or_default().to_string(),
        }
    }
}

/// Gateway to a bus service (BlueZ by default) on the system bus
pub struct DbusGateway {
    conn: Connection,
    service: BusName<'static>,
    timeout: Duration,
    next_id: Cell<u64>,
    tokens: RefCell<HashMap<SubscriptionId, Token>>,
    events_tx: Sender<SignalEvent>,
    events_rx: Receiver<SignalEvent>,
}

impl DbusGateway {
    /// Connect to the system bus and talk to BlueZ
    pub fn system() -> Result<Self, BusError> {
        let conn = Connection::new_system().map_err(|e| BusError::Transport(e.to_string()))?;
        Self::new(conn, BLUEZ_SERVICE, DEFAULT_CALL_TIMEOUT)
    }

    /// Wrap an existing connection, addressing `service` with a per-call `timeout`
    pub fn new(conn: Connection, service: &str, timeout: Duration) -> Result<Self, BusError> {
        let service = BusName::new(service.to_string()).map_err(BusError::InvalidArgument)?;
        let (events_tx, events_rx) = mpsc::channel();

        Ok(Self {
            conn,
            service,
            timeout,
            next_id: Cell::new(1),
            tokens: RefCell::new(HashMap::new()),
            events_tx,
            events_rx,
        })
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn method_call(
        &self,
        path: &str,
        interface: &str,
        method: &str,
    ) -> Result<Message, BusError> {
        Message::new_method_call(
            self.service.clone(),
            object_path(path)?,
            interface_name(interface)?,
            member_name(method)?,
        )
        .map_err(BusError::InvalidArgument)
    }

    fn send(&self, msg: Message) -> Result<Vec<Value>, BusError> {
        let reply = self.conn.send_with_reply_and_block(msg, self.timeout)?;
        Ok(message_values(&reply))
    }
}

impl BusGateway for DbusGateway {
    fn managed_objects(&self) -> Result<ObjectTree, BusError> {
        let proxy = self.conn.with_proxy(self.service.clone(), "/", self.timeout);
        let objects = proxy.get_managed_objects()?;

        let mut tree = ObjectTree::new();
        for (path, interfaces) in objects {
            let interfaces = interfaces
                .into_iter()
                .map(|(name, props)| (name, from_prop_map(&props)))
                .collect();
            tree.insert(path.to_string(), interfaces);
        }
        trace!("Enumerated {} bus objects", tree.len());
        Ok(tree)
    }

    fn call(
        &self,
        path: &str,
        interface: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Vec<Value>, BusError> {
        let mut msg = self.method_call(path, interface, method)?;
        {
            let mut appender = IterAppend::new(&mut msg);
            for arg in &args {
                to_ref_arg(arg)?.append(&mut appender);
            }
        }
        debug!("Calling {}.{} on {}", interface, method, path);
        self.send(msg)
    }

    fn get_property(&self, path: &str, interface: &str, name: &str) -> Result<Value, BusError> {
        let mut msg = self.method_call(path, PROPERTIES_INTERFACE, "Get")?;
        msg = msg.append2(interface, name);

        self.send(msg)?.into_iter().next().ok_or_else(|| BusError::Call {
            name: "org.freedesktop.DBus.Error.InvalidSignature".to_string(),
            message: format!("Empty reply reading {}.{}", interface, name),
        })
    }

    fn set_property(
        &self,
        path: &str,
        interface: &str,
        name: &str,
        value: Value,
    ) -> Result<(), BusError> {
        let mut msg = self.method_call(path, PROPERTIES_INTERFACE, "Set")?;
        msg = msg.append3(interface, name, Variant(to_ref_arg(&value)?));
        self.send(msg).map(|_| ())
    }

    fn subscribe(
        &self,
        path: &str,
        interface: &str,
        member: &str,
    ) -> Result<SubscriptionId, BusError> {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        // The sender is left out of the rule: signals carry BlueZ's unique
        // name, which would never equal the well-known service name locally.
        let rule = MatchRule::new_signal(interface_name(interface)?, member_name(member)?)
            .with_path(object_path(path)?);

        let events = self.events_tx.clone();
        let token = self.conn.add_match(
            rule,
            move |signal: PropertiesPropertiesChanged, _: &Connection, _: &Message| {
                let event = SignalEvent {
                    subscription: id,
                    interface: signal.interface_name,
                    changed: from_prop_map(&signal.changed_properties),
                    invalidated: signal.invalidated_properties,
                };
                // The receiver lives as long as the gateway that owns this rule
                let _ = events.send(event);
                true
            },
        )?;

        self.tokens.borrow_mut().insert(id, token);
        debug!("Subscribed {} to {}.{} on {}", id, interface, member, path);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), BusError> {
        let token = self
            .tokens
            .borrow_mut()
            .remove(&id)
            .ok_or(BusError::UnknownSubscription(id))?;
        self.conn.remove_match(token)?;
        debug!("Unsubscribed {}", id);
        Ok(())
    }

    fn process(&self, timeout: Duration) -> Result<Vec<SignalEvent>, BusError> {
        self.conn.process(timeout)?;
        Ok(self.events_rx.try_iter().collect())
    }
}

/// Every argument of `msg`, in order
fn message_values(msg: &Message) -> Vec<Value> {
    let mut iter = msg.iter_init();
    let mut values = Vec::new();
    while let Some(arg) = iter.get_refarg() {
        values.push(from_ref_arg(&*arg));
        iter.next();
    }
    values
}

fn object_path(path: &str) -> Result<Path<'static>, BusError> {
    Path::new(path.to_string()).map_err(BusError::InvalidArgument)
}

fn interface_name(interface: &str) -> Result<Interface<'static>, BusError> {
    Interface::new(interface.to_string()).map_err(BusError::InvalidArgument)
}

fn member_name(member: &str) -> Result<Member<'static>, BusError> {
    Member::new(member.to_string()).map_err(BusError::InvalidArgument)
}

fn from_prop_map(props: &PropMap) -> PropertyMap {
    props
        .iter()
        .map(|(name, value)| (name.clone(), from_ref_arg(&*value.0)))
        .collect()
}

/// Convert a received argument into a [`Value`]
fn from_ref_arg(arg: &dyn RefArg) -> Value {
    let other = || Value::Other(arg.signature().to_string());

    match arg.arg_type() {
        ArgType::Boolean => arg.as_u64().map(|v| Value::Bool(v != 0)).unwrap_or_else(other),
        ArgType::Int16 => arg.as_i64().map(|v| Value::Int16(v as i16)).unwrap_or_else(other),
        ArgType::UInt16 => arg.as_u64().map(|v| Value::UInt16(v as u16)).unwrap_or_else(other),
        ArgType::UInt32 => arg.as_u64().map(|v| Value::UInt32(v as u32)).unwrap_or_else(other),
        ArgType::String => arg
            .as_str()
            .map(|s| Value::Str(s.to_string()))
            .unwrap_or_else(other),
        ArgType::ObjectPath => arg
            .as_str()
            .map(|s| Value::ObjectPath(s.to_string()))
            .unwrap_or_else(other),
        ArgType::Variant => arg
            .as_iter()
            .and_then(|mut inner| inner.next().map(from_ref_arg))
            .unwrap_or_else(other),
        ArgType::Array => from_array(arg).unwrap_or_else(other),
        _ => other(),
    }
}

fn from_array(arg: &dyn RefArg) -> Option<Value> {
    let signature = arg.signature();
    let items = arg.as_iter()?;

    match &*signature {
        "ay" => items
            .map(|item| item.as_u64().map(|b| b as u8))
            .collect::<Option<Vec<u8>>>()
            .map(Value::Bytes),
        "as" | "ao" => items
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<String>>>()
            .map(Value::StrList),
        sig if sig.starts_with("a{s") => {
            // Dictionaries iterate as alternating keys and values
            let mut map = PropertyMap::new();
            let mut items = items;
            while let (Some(key), Some(value)) = (items.next(), items.next()) {
                map.insert(key.as_str()?.to_string(), from_ref_arg(value));
            }
            Some(Value::Dict(map))
        }
        _ => None,
    }
}

/// Convert a [`Value`] into an argument that can be appended to a message
fn to_ref_arg(value: &Value) -> Result<Box<dyn RefArg>, BusError> {
    Ok(match value {
        Value::Bool(b) => Box::new(*b),
        Value::Int16(v) => Box::new(*v),
        Value::UInt16(v) => Box::new(*v),
        Value::UInt32(v) => Box::new(*v),
        Value::Str(s) => Box::new(s.clone()),
        Value::ObjectPath(p) => Box::new(object_path(p)?),
        Value::Bytes(b) => Box::new(b.clone()),
        Value::StrList(list) => Box::new(list.clone()),
        Value::Dict(map) => {
            let mut props = PropMap::new();
            for (key, value) in map {
                props.insert(key.clone(), Variant(to_ref_arg(value)?));
            }
            Box::new(props)
        }
        Value::Other(signature) => {
            return Err(BusError::InvalidArgument(format!(
                "cannot send opaque value of type {}",
                signature
            )))
        }
    })
}
