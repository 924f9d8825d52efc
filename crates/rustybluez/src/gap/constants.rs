use std::time::Duration;

// BlueZ service and interfaces
pub const BLUEZ_SERVICE: &str = "org.bluez";
pub const ADAPTER_INTERFACE: &str = "org.bluez.Adapter1";
pub const DEVICE_INTERFACE: &str = "org.bluez.Device1";
pub const GATT_SERVICE_INTERFACE: &str = "org.bluez.GattService1";
pub const GATT_CHARACTERISTIC_INTERFACE: &str = "org.bluez.GattCharacteristic1";
pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";
pub const OBJECT_MANAGER_INTERFACE: &str = "org.freedesktop.DBus.ObjectManager";

pub const PROPERTIES_CHANGED: &str = "PropertiesChanged";

// Object layout
pub const DEFAULT_ADAPTER_PATH: &str = "/org/bluez/hci0";
pub const DEVICE_NODE_PREFIX: &str = "dev_";

// Adapter methods
pub const METHOD_START_DISCOVERY: &str = "StartDiscovery";
pub const METHOD_STOP_DISCOVERY: &str = "StopDiscovery";
pub const METHOD_SET_DISCOVERY_FILTER: &str = "SetDiscoveryFilter";
pub const METHOD_REMOVE_DEVICE: &str = "RemoveDevice";

// Device methods
pub const METHOD_CONNECT: &str = "Connect";
pub const METHOD_DISCONNECT: &str = "Disconnect";

// Device properties
pub const PROP_ADDRESS: &str = "Address";
pub const PROP_NAME: &str = "Name";
pub const PROP_ALIAS: &str = "Alias";
pub const PROP_PAIRED: &str = "Paired";
pub const PROP_CONNECTED: &str = "Connected";
pub const PROP_TRUSTED: &str = "Trusted";
pub const PROP_UUIDS: &str = "UUIDs";
pub const PROP_RSSI: &str = "RSSI";

// Discovery filter keys
pub const FILTER_UUIDS: &str = "UUIDs";

// Connection confirmation polling
pub const CONNECT_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub const CONNECT_POLL_ATTEMPTS: u32 = 50;

// Event pump
pub const DEFAULT_EVENT_TIMEOUT: Duration = Duration::from_millis(100);
