use crate::bus::SignalEvent;
use crate::gap::constants::GATT_CHARACTERISTIC_INTERFACE;
use crate::gatt::constants::PROP_VALUE;

/// Receives every new value of a subscribed characteristic
pub type NotificationCallback = Box<dyn FnMut(&[u8]) + Send>;

/// The new characteristic value carried by `event`, if any
pub fn notified_value(event: &SignalEvent) -> Option<&[u8]> {
    if event.interface != GATT_CHARACTERISTIC_INTERFACE {
        return None;
    }
    event.changed.get(PROP_VALUE)?.as_bytes()
}
