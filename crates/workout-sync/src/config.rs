//! Sync timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing knobs for the sync coordinator.
///
/// All values are milliseconds so the struct maps directly onto a config
/// file section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet interval before a save fires.
    pub debounce_ms: u64,
    /// Wait after a session-changed broadcast before reloading.
    pub external_reload_delay_ms: u64,
    /// Duration clock refresh period.
    pub tick_interval_ms: u64,
    /// Upper bound on any single remote call.
    pub request_timeout_ms: u64,
    /// Buffered signals per subscriber.
    pub signal_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            external_reload_delay_ms: 100,
            tick_interval_ms: 1000,
            request_timeout_ms: 10_000,
            signal_capacity: 64,
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn external_reload_delay(&self) -> Duration {
        Duration::from_millis(self.external_reload_delay_ms)
    }

    /// Tick period, never zero.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Set the debounce interval.
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }
}
