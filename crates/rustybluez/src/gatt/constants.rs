// GATT object properties
pub const PROP_UUID: &str = "UUID";
pub const PROP_FLAGS: &str = "Flags";
pub const PROP_VALUE: &str = "Value";

// Characteristic methods
pub const METHOD_READ_VALUE: &str = "ReadValue";
pub const METHOD_WRITE_VALUE: &str = "WriteValue";
pub const METHOD_START_NOTIFY: &str = "StartNotify";
pub const METHOD_STOP_NOTIFY: &str = "StopNotify";
pub const METHOD_ACQUIRE_NOTIFY: &str = "AcquireNotify";

// Method option keys
pub const OPTION_MTU: &str = "mtu";

// Characteristic flag strings
pub const FLAG_BROADCAST: &str = "broadcast";
pub const FLAG_READ: &str = "read";
pub const FLAG_WRITE_WITHOUT_RESPONSE: &str = "write-without-response";
pub const FLAG_WRITE: &str = "write";
pub const FLAG_NOTIFY: &str = "notify";
pub const FLAG_INDICATE: &str = "indicate";
pub const FLAG_AUTHENTICATED_SIGNED_WRITES: &str = "authenticated-signed-writes";
pub const FLAG_EXTENDED_PROPERTIES: &str = "extended-properties";
pub const FLAG_RELIABLE_WRITE: &str = "reliable-write";
pub const FLAG_WRITABLE_AUXILIARIES: &str = "writable-auxiliaries";
