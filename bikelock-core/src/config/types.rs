//! Configuration type definitions
//!
//! These types represent the terminal configuration. A provisioned
//! configuration is stored as postcard-serialized binary data.

use crate::card::DebounceConfig;
use crate::comm::ComConfig;
use crate::location::ScheduleConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current configuration layout version
pub const CONFIG_VERSION: u8 = 1;

/// Battery level below which a warning is reported (percent)
pub const LOW_BATTERY_PERCENT: f32 = 20.0;

/// How long the lock release is driven (ms)
pub const UNLOCK_PULSE_MS: u32 = 5000;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Blob could not be decoded
    Deserialize,
    /// Blob could not be encoded
    Serialize,
    /// Blob has a different layout version
    VersionMismatch,
    /// Debounce threshold is zero or unreachable
    InvalidDebounce,
    /// A schedule interval or acquisition limit is zero
    InvalidSchedule,
    /// Server URL is not a plain `http://` URL
    InvalidServerUrl,
    /// Low-battery threshold is outside 0..=100
    InvalidBatteryThreshold,
    /// Lock release duration is zero
    InvalidUnlockPulse,
}

/// Complete terminal configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TerminalConfig {
    /// Configuration layout version
    pub version: u8,
    /// Bike number reported to the server
    pub bike_id: u32,
    /// Card debounce thresholds
    pub debounce: DebounceConfig,
    /// Location report schedule
    pub schedule: ScheduleConfig,
    /// Server and modem settings
    pub com: ComConfig,
    /// Report low battery below this level (percent)
    pub low_battery_percent: f32,
    /// Lock release duration (ms)
    pub unlock_pulse_ms: u32,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            bike_id: 1,
            debounce: DebounceConfig::default(),
            schedule: ScheduleConfig::default(),
            com: ComConfig::default(),
            low_battery_percent: LOW_BATTERY_PERCENT,
            unlock_pulse_ms: UNLOCK_PULSE_MS,
        }
    }
}

impl TerminalConfig {
    /// Check the configuration for values the terminal cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }

        // Counters saturate at u8::MAX, so that threshold could never be passed
        let threshold_ok = |t: u8| t > 0 && t < u8::MAX;
        if !threshold_ok(self.debounce.read_threshold)
            || !threshold_ok(self.debounce.detach_threshold)
        {
            return Err(ConfigError::InvalidDebounce);
        }

        let s = &self.schedule;
        if s.rented_interval_ms == 0
            || s.idle_interval_ms == 0
            || s.unavailable_interval_ms == 0
            || s.acquire_timeout_ms == 0
            || s.acquire_poll_ms == 0
        {
            return Err(ConfigError::InvalidSchedule);
        }

        // The URL is quoted inside a modem command and gets a query appended
        let url = self.com.server_url.as_str();
        if !url.starts_with("http://")
            || url.len() == "http://".len()
            || url.contains(['"', '?', ' '])
        {
            return Err(ConfigError::InvalidServerUrl);
        }

        if !(0.0..=100.0).contains(&self.low_battery_percent) {
            return Err(ConfigError::InvalidBatteryThreshold);
        }

        if self.unlock_pulse_ms == 0 {
            return Err(ConfigError::InvalidUnlockPulse);
        }

        Ok(())
    }
}
