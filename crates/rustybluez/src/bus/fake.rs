//! In-memory gateway used by the unit tests

use super::{
    is_nested, BusError, BusGateway, InterfaceMap, ObjectTree, PropertyMap, SignalEvent,
    SubscriptionId, Value,
};
use crate::gap::constants::{PROPERTIES_CHANGED, PROPERTIES_INTERFACE};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

/// A method call recorded by the fake bus
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub path: String,
    pub interface: String,
    pub method: String,
    pub args: Vec<Value>,
}

#[derive(Default)]
struct State {
    objects: ObjectTree,
    calls: Vec<RecordedCall>,
    replies: HashMap<(String, String), Vec<Value>>,
    failures: HashMap<(String, String), BusError>,
    scripted_properties: HashMap<(String, String), VecDeque<Value>>,
    property_reads: usize,
    failing_property_sets: bool,
    enumeration_fails: bool,
    subscribe_fails: bool,
    process_fails: bool,
    next_id: u64,
    subscriptions: BTreeMap<SubscriptionId, (String, String, String)>,
    pending: VecDeque<SignalEvent>,
}

/// Scriptable stand-in for the system bus
///
/// Clones share state, so a test keeps one handle while the manager owns another.
#[derive(Clone, Default)]
pub struct FakeBus {
    state: Rc<RefCell<State>>,
}

pub fn remote_error(message: &str) -> BusError {
    BusError::Call {
        name: "org.bluez.Error.Failed".to_string(),
        message: message.to_string(),
    }
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or extend) an object exposing `interface` with `props`
    pub fn add_object(&self, path: &str, interface: &str, props: Vec<(&str, Value)>) {
        let props: PropertyMap = props
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        self.state
            .borrow_mut()
            .objects
            .entry(path.to_string())
            .or_insert_with(InterfaceMap::new)
            .insert(interface.to_string(), props);
    }

    /// Remove an object together with every object below it
    pub fn remove_object(&self, path: &str) {
        self.state
            .borrow_mut()
            .objects
            .retain(|object, _| !is_nested(object, path));
    }

    /// Answer calls to `method` on `path` with `reply`
    pub fn reply_with(&self, path: &str, method: &str, reply: Vec<Value>) {
        self.state
            .borrow_mut()
            .replies
            .insert((path.to_string(), method.to_string()), reply);
    }

    /// Make calls to `method` on `path` fail
    pub fn fail_call(&self, path: &str, method: &str, error: BusError) {
        self.state
            .borrow_mut()
            .failures
            .insert((path.to_string(), method.to_string()), error);
    }

    /// Answer successive reads of `name` on `path` with `values`, repeating the last one
    pub fn script_property(&self, path: &str, name: &str, values: Vec<Value>) {
        self.state
            .borrow_mut()
            .scripted_properties
            .insert((path.to_string(), name.to_string()), values.into());
    }

    pub fn fail_enumeration(&self, fails: bool) {
        self.state.borrow_mut().enumeration_fails = fails;
    }

    pub fn fail_subscribe(&self, fails: bool) {
        self.state.borrow_mut().subscribe_fails = fails;
    }

    pub fn fail_processing(&self, fails: bool) {
        self.state.borrow_mut().process_fails = fails;
    }

    pub fn fail_property_sets(&self, fails: bool) {
        self.state.borrow_mut().failing_property_sets = fails;
    }

    /// Emit a property change from `path`, queueing it for every matching subscription
    pub fn emit_properties_changed(&self, path: &str, interface: &str, changed: Vec<(&str, Value)>) {
        let changed: PropertyMap = changed
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();

        let mut state = self.state.borrow_mut();
        let matching: Vec<SubscriptionId> = state
            .subscriptions
            .iter()
            .filter(|(_, (sub_path, sub_iface, member))| {
                sub_path == path && sub_iface == PROPERTIES_INTERFACE && member == PROPERTIES_CHANGED
            })
            .map(|(id, _)| *id)
            .collect();

        for subscription in matching {
            state.pending.push_back(SignalEvent {
                subscription,
                interface: interface.to_string(),
                changed: changed.clone(),
                invalidated: Vec::new(),
            });
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.borrow().calls.clone()
    }

    /// Recorded calls of `method`, in order
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .collect()
    }

    pub fn property_reads(&self) -> usize {
        self.state.borrow().property_reads
    }

    /// Number of live subscriptions on `path`
    pub fn subscriptions_on(&self, path: &str) -> usize {
        self.state
            .borrow()
            .subscriptions
            .values()
            .filter(|(sub_path, _, _)| sub_path == path)
            .count()
    }

    pub fn live_subscriptions(&self) -> usize {
        self.state.borrow().subscriptions.len()
    }
}

impl BusGateway for FakeBus {
    fn managed_objects(&self) -> Result<ObjectTree, BusError> {
        let state = self.state.borrow();
        if state.enumeration_fails {
            return Err(BusError::Transport("connection reset".into()));
        }
        Ok(state.objects.clone())
    }

    fn call(
        &self,
        path: &str,
        interface: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Vec<Value>, BusError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(RecordedCall {
            path: path.to_string(),
            interface: interface.to_string(),
            method: method.to_string(),
            args,
        });

        let key = (path.to_string(), method.to_string());
        if let Some(error) = state.failures.get(&key) {
            return Err(error.clone());
        }
        Ok(state.replies.get(&key).cloned().unwrap_or_default())
    }

    fn get_property(&self, path: &str, interface: &str, name: &str) -> Result<Value, BusError> {
        let mut state = self.state.borrow_mut();
        state.property_reads += 1;

        if let Some(values) = state
            .scripted_properties
            .get_mut(&(path.to_string(), name.to_string()))
        {
            if values.len() > 1 {
                return values.pop_front().ok_or_else(|| remote_error("empty script"));
            }
            return values.front().cloned().ok_or_else(|| remote_error("empty script"));
        }

        state
            .objects
            .get(path)
            .and_then(|interfaces| interfaces.get(interface))
            .and_then(|props| props.get(name))
            .cloned()
            .ok_or_else(|| BusError::Call {
                name: "org.freedesktop.DBus.Error.UnknownObject".to_string(),
                message: format!("{} has no {}.{}", path, interface, name),
            })
    }

    fn set_property(
        &self,
        path: &str,
        interface: &str,
        name: &str,
        value: Value,
    ) -> Result<(), BusError> {
        let mut state = self.state.borrow_mut();
        if state.failing_property_sets {
            return Err(remote_error("property is read-only"));
        }
        let props = state
            .objects
            .get_mut(path)
            .and_then(|interfaces| interfaces.get_mut(interface))
            .ok_or_else(|| remote_error("no such object"))?;
        props.insert(name.to_string(), value);
        Ok(())
    }

    fn subscribe(
        &self,
        path: &str,
        interface: &str,
        member: &str,
    ) -> Result<SubscriptionId, BusError> {
        let mut state = self.state.borrow_mut();
        if state.subscribe_fails {
            return Err(BusError::Transport("match rule rejected".into()));
        }
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        state.subscriptions.insert(
            id,
            (path.to_string(), interface.to_string(), member.to_string()),
        );
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), BusError> {
        self.state
            .borrow_mut()
            .subscriptions
            .remove(&id)
            .map(|_| ())
            .ok_or(BusError::UnknownSubscription(id))
    }

    fn process(&self, _timeout: Duration) -> Result<Vec<SignalEvent>, BusError> {
        let mut state = self.state.borrow_mut();
        if state.process_fails {
            return Err(BusError::Transport("connection closed".into()));
        }
        Ok(state.pending.drain(..).collect())
    }
}
