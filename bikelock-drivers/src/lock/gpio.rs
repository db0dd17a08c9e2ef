//! GPIO lock release
//!
//! The lock is released by driving its solenoid (directly or via a MOSFET)
//! for a fixed time and then switching it off again.

use bikelock_core::config::{TerminalConfig, UNLOCK_PULSE_MS};
use bikelock_core::traits::LockActuator;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Lock driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockError {
    /// The output pin could not be driven
    Pin,
}

/// GPIO lock release
///
/// The pin can be configured as active-high (default) or active-low.
pub struct GpioLock<P, D> {
    pin: P,
    delay: D,
    /// If true, release = pin LOW
    inverted: bool,
    pulse_ms: u32,
}

impl<P: OutputPin, D: DelayNs> GpioLock<P, D> {
    /// Create a new GPIO lock, driving the output to its idle level
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin driving the release
    /// - `delay`: Delay used to time the pulse
    /// - `pulse_ms`: How long the release is driven
    /// - `inverted`: If true, the release is driven with the pin LOW
    pub fn new(pin: P, delay: D, pulse_ms: u32, inverted: bool) -> Result<Self, LockError> {
        let mut lock = Self {
            pin,
            delay,
            inverted,
            pulse_ms,
        };
        lock.drive(false)?;
        Ok(lock)
    }

    /// Create a lock with the provisioned pulse length
    ///
    /// This is how the terminal's lock is normally built; the fixed-length
    /// constructors below are for bring-up.
    pub fn from_config(
        pin: P,
        delay: D,
        config: &TerminalConfig,
        inverted: bool,
    ) -> Result<Self, LockError> {
        Self::new(pin, delay, config.unlock_pulse_ms, inverted)
    }

    /// Create an active-high lock with the default pulse length
    pub fn new_active_high(pin: P, delay: D) -> Result<Self, LockError> {
        Self::new(pin, delay, UNLOCK_PULSE_MS, false)
    }

    /// Create an active-low lock with the default pulse length
    pub fn new_active_low(pin: P, delay: D) -> Result<Self, LockError> {
        Self::new(pin, delay, UNLOCK_PULSE_MS, true)
    }

    /// Pulse length in milliseconds
    pub fn pulse_ms(&self) -> u32 {
        self.pulse_ms
    }

    fn drive(&mut self, release: bool) -> Result<(), LockError> {
        let result = if release != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| LockError::Pin)
    }
}

impl<P: OutputPin, D: DelayNs> LockActuator for GpioLock<P, D> {
    type Error = LockError;

    fn pulse(&mut self) -> Result<(), LockError> {
        let released = self.drive(true);
        if released.is_ok() {
            self.delay.delay_ms(self.pulse_ms);
        }
        // Always try to switch the release off again
        self.drive(false)?;
        released
    }
}
