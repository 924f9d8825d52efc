//! Manager configuration

use crate::gap::constants::{
    CONNECT_POLL_ATTEMPTS, CONNECT_POLL_INTERVAL, DEFAULT_ADAPTER_PATH, DEFAULT_EVENT_TIMEOUT,
};
use std::time::Duration;

/// Bluetooth manager configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Adapter to prefer when it exists; otherwise the first adapter found is used
    pub default_adapter_path: String,
    /// Delay before each `Connected` poll after a connect request
    pub connect_poll_interval: Duration,
    /// Number of `Connected` polls before a connect is given up
    pub connect_poll_attempts: u32,
    /// How long one event pump waits for bus traffic
    pub event_timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            default_adapter_path: DEFAULT_ADAPTER_PATH.to_string(),
            connect_poll_interval: CONNECT_POLL_INTERVAL,
            connect_poll_attempts: CONNECT_POLL_ATTEMPTS,
            event_timeout: DEFAULT_EVENT_TIMEOUT,
        }
    }
}

impl ManagerConfig {
    pub fn with_adapter_path(mut self, path: impl Into<String>) -> Self {
        self.default_adapter_path = path.into();
        self
    }

    pub fn with_connect_poll_interval(mut self, interval: Duration) -> Self {
        self.connect_poll_interval = interval;
        self
    }

    pub fn with_connect_poll_attempts(mut self, attempts: u32) -> Self {
        self.connect_poll_attempts = attempts;
        self
    }

    pub fn with_event_timeout(mut self, timeout: Duration) -> Self {
        self.event_timeout = timeout;
        self
    }

    /// Upper bound on how long a connect can block
    pub fn connect_timeout(&self) -> Duration {
        self.connect_poll_interval * self.connect_poll_attempts
    }
}
