//! Lock actuator trait

/// Trait for the lock release mechanism
pub trait LockActuator {
    /// Error type for actuator operations
    type Error;

    /// Release the lock
    ///
    /// Drives the release for its configured duration and returns when the
    /// output is off again.
    fn pulse(&mut self) -> Result<(), Self::Error>;
}
