//! Monotonic clock trait

use crate::clock::Millis;

/// Millisecond clock
///
/// The value is expected to wrap at `u32::MAX`; interval checks in this
/// crate handle the wrap.
pub trait Clock {
    /// Milliseconds since boot
    fn now_ms(&self) -> Millis;
}
