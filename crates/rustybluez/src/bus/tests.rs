//! Unit tests for the bus abstraction

use super::fake::FakeBus;
use super::*;
use crate::gap::constants::{PROPERTIES_CHANGED, PROPERTIES_INTERFACE};

#[test]
fn test_is_nested() {
    let device = "/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF";

    assert!(is_nested(device, device));
    assert!(is_nested(&format!("{}/service0010", device), device));
    assert!(is_nested(&format!("{}/service0010/char0011", device), device));

    // A sibling sharing a prefix is not below the device
    assert!(!is_nested("/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF0", device));
    assert!(!is_nested("/org/bluez/hci0", device));
    assert!(is_nested("/org/bluez/hci0", "/"));
}

#[test]
fn test_is_strictly_nested() {
    let service = "/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF/service0010";

    assert!(!is_strictly_nested(service, service));
    assert!(is_strictly_nested(&format!("{}/char0011", service), service));
    assert!(!is_strictly_nested(
        "/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF/service0020/char0021",
        service
    ));
}

#[test]
fn test_registry_replaces_entry_for_same_path() {
    let mut registry: Registry<&str> = Registry::new();

    assert!(registry.insert("/a", SubscriptionId(1), "first").is_none());
    let previous = registry.insert("/a", SubscriptionId(2), "second").unwrap();

    assert_eq!(previous.subscription, SubscriptionId(1));
    assert_eq!(previous.handler, "first");
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.path_of(SubscriptionId(2)), Some("/a"));
    // The replaced subscription no longer resolves
    assert_eq!(registry.path_of(SubscriptionId(1)), None);
}

#[test]
fn test_registry_remove_where() {
    let mut registry: Registry<u8> = Registry::new();
    registry.insert("/dev_1/service1/char1", SubscriptionId(1), 1);
    registry.insert("/dev_1/service1/char2", SubscriptionId(2), 2);
    registry.insert("/dev_2/service1/char1", SubscriptionId(3), 3);

    let removed = registry.remove_where(|path| is_nested(path, "/dev_1"));

    let removed_paths: Vec<&str> = removed.iter().map(|(path, _)| path.as_str()).collect();
    assert_eq!(removed_paths, vec!["/dev_1/service1/char1", "/dev_1/service1/char2"]);
    assert_eq!(registry.paths().collect::<Vec<_>>(), vec!["/dev_2/service1/char1"]);
    assert_eq!(registry.path_of(SubscriptionId(1)), None);
    assert_eq!(registry.path_of(SubscriptionId(3)), Some("/dev_2/service1/char1"));
}

#[test]
fn test_registry_drain() {
    let mut registry: Registry<()> = Registry::new();
    registry.insert("/a", SubscriptionId(1), ());
    registry.insert("/b", SubscriptionId(2), ());

    assert_eq!(registry.drain().len(), 2);
    assert!(registry.is_empty());
    assert_eq!(registry.path_of(SubscriptionId(2)), None);
    assert!(registry.remove("/a").is_none());
}

#[test]
fn test_value_accessors() {
    assert_eq!(Value::from(true).as_bool(), Some(true));
    assert_eq!(Value::Int16(-60).as_i16(), Some(-60));
    assert_eq!(Value::ObjectPath("/org/bluez".into()).as_str(), Some("/org/bluez"));
    assert_eq!(Value::from(vec![1u8, 2]).as_bytes(), Some(&[1u8, 2][..]));
    assert_eq!(Value::Str("x".into()).as_bool(), None);
    assert_eq!(Value::Other("h".into()).as_bytes(), None);
}

#[test]
fn test_value_display() {
    assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_string(), "0xdead");
    assert_eq!(Value::Str("hi".into()).to_string(), "\"hi\"");
    assert_eq!(
        Value::StrList(vec!["read".into(), "notify".into()]).to_string(),
        "[read, notify]"
    );
    assert_eq!(SubscriptionId(7).to_string(), "#7");
}

#[test]
fn test_fake_bus_routes_signals_to_subscribers() {
    let bus = FakeBus::new();
    let id = bus
        .subscribe("/obj", PROPERTIES_INTERFACE, PROPERTIES_CHANGED)
        .unwrap();

    bus.emit_properties_changed("/obj", "org.example", vec![("Level", Value::UInt16(3))]);
    bus.emit_properties_changed("/other", "org.example", vec![("Level", Value::UInt16(4))]);

    let events = bus.process(std::time::Duration::ZERO).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].subscription, id);
    assert_eq!(events[0].changed.get("Level"), Some(&Value::UInt16(3)));

    bus.unsubscribe(id).unwrap();
    assert_eq!(bus.unsubscribe(id), Err(BusError::UnknownSubscription(id)));
}

#[test]
fn test_fake_bus_removes_object_subtree() {
    let bus = FakeBus::new();
    let device = "/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF";
    bus.add_object("/org/bluez/hci0", "org.bluez.Adapter1", vec![]);
    bus.add_object(device, "org.bluez.Device1", vec![]);
    bus.add_object(&format!("{}/service000c", device), "org.bluez.GattService1", vec![]);
    bus.add_object(
        &format!("{}/service000c/char000d", device),
        "org.bluez.GattCharacteristic1",
        vec![],
    );
    bus.add_object("/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF0", "org.bluez.Device1", vec![]);

    bus.remove_object(device);

    let remaining: Vec<String> = bus.managed_objects().unwrap().into_keys().collect();
    assert_eq!(
        remaining,
        vec![
            "/org/bluez/hci0".to_string(),
            "/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF0".to_string(),
        ]
    );
}
