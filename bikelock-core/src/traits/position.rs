//! Position fix source trait

use crate::location::Fix;

/// Trait for the GPS receiver
///
/// The receiver draws significant current, so it is only enabled for the
/// duration of an acquisition attempt.
pub trait PositionSource {
    /// Power up the receiver
    fn enable(&mut self);

    /// Check for a position fix
    ///
    /// Returns `None` while the receiver has no fix yet.
    fn poll(&mut self) -> Option<Fix>;

    /// Power down the receiver
    fn disable(&mut self);
}
