//! Unit tests for converting between bus messages and `Value`s

use super::*;

fn round_trip(values: &[Value]) -> Vec<Value> {
    let mut msg = Message::new_method_call(
        BLUEZ_SERVICE,
        "/org/bluez/hci0",
        "org.bluez.Adapter1",
        "SetDiscoveryFilter",
    )
    .unwrap();
    {
        let mut appender = IterAppend::new(&mut msg);
        for value in values {
            to_ref_arg(value).unwrap().append(&mut appender);
        }
    }
    message_values(&msg)
}

#[test]
fn test_scalar_round_trip() {
    let values = vec![
        Value::Bool(true),
        Value::Int16(-60),
        Value::UInt16(517),
        Value::UInt32(70_000),
        Value::Str("Heart Rate".into()),
        Value::ObjectPath("/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF".into()),
    ];

    assert_eq!(round_trip(&values), values);
}

#[test]
fn test_array_round_trip() {
    let values = vec![
        Value::Bytes(vec![0x06, 0x48, 0x00]),
        Value::Bytes(Vec::new()),
        Value::StrList(vec!["read".into(), "notify".into()]),
    ];

    assert_eq!(round_trip(&values), values);
}

#[test]
fn test_dictionary_round_trip() {
    let mut props = PropertyMap::new();
    props.insert("Value".into(), Value::Bytes(vec![0x01, 0x02]));
    props.insert(
        "UUIDs".into(),
        Value::StrList(vec!["0000180d-0000-1000-8000-00805f9b34fb".into()]),
    );
    props.insert("RSSI".into(), Value::Int16(-72));

    let values = round_trip(&[Value::Dict(props.clone())]);

    assert_eq!(values, vec![Value::Dict(props)]);
}

#[test]
fn test_variant_is_unwrapped() {
    let variant = Variant(Box::new(247u16) as Box<dyn RefArg>);
    assert_eq!(from_ref_arg(&variant), Value::UInt16(247));

    let inner = Variant(Box::new(true) as Box<dyn RefArg>);
    let nested = Variant(Box::new(inner) as Box<dyn RefArg>);
    assert_eq!(from_ref_arg(&nested), Value::Bool(true));
}

#[test]
fn test_changed_properties_map() {
    let mut changed = PropMap::new();
    changed.insert("Value".into(), Variant(Box::new(vec![0x10u8, 0x20]) as Box<dyn RefArg>));
    changed.insert("RSSI".into(), Variant(Box::new(-55i16) as Box<dyn RefArg>));
    changed.insert(
        "Includes".into(),
        Variant(Box::new(vec![Path::from(
            "/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF/service0001",
        )]) as Box<dyn RefArg>),
    );

    let props = from_prop_map(&changed);

    assert_eq!(props.get("Value"), Some(&Value::Bytes(vec![0x10, 0x20])));
    assert_eq!(props.get("RSSI"), Some(&Value::Int16(-55)));
    assert_eq!(
        props.get("Includes"),
        Some(&Value::StrList(vec![
            "/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF/service0001".to_string()
        ]))
    );
}

#[test]
fn test_unsupported_types_are_opaque() {
    assert_eq!(from_ref_arg(&7u8), Value::Other("y".into()));
    assert_eq!(from_ref_arg(&1.5f64), Value::Other("d".into()));
}

#[test]
fn test_unsendable_values_are_refused() {
    assert!(matches!(
        to_ref_arg(&Value::Other("h".into())),
        Err(BusError::InvalidArgument(_))
    ));
    assert!(matches!(
        to_ref_arg(&Value::ObjectPath("not a path".into())),
        Err(BusError::InvalidArgument(_))
    ));

    let mut props = PropertyMap::new();
    props.insert("fd".into(), Value::Other("h".into()));
    assert!(to_ref_arg(&Value::Dict(props)).is_err());
}
