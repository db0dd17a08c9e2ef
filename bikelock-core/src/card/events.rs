//! Events produced by one card evaluation

use bikelock_protocol::CardUid;

/// Result of evaluating one reader sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CardEvent {
    /// Nothing new this cycle
    None,
    /// A card appeared (may still be a misread)
    Detected,
    /// A new card was read consistently
    Confirmed(CardUid),
    /// The previously confirmed card was read consistently again
    SameCardAgain,
    /// The card stopped answering (may be a bad contact)
    Detached,
    /// The confirmed card has been gone long enough
    DetachConfirmed,
    /// A card went away before it was confirmed
    ReadInterrupted,
    /// A different card replaced the confirmed one
    ErrorCardChanged,
    /// A card was presented while the vehicle is out of service
    ErrorVehicleUnavailable,
}

impl CardEvent {
    /// Check if this event should be shown to the rider
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            CardEvent::ErrorCardChanged | CardEvent::ErrorVehicleUnavailable
        )
    }

    /// Card confirmed by this event, if any
    pub fn confirmed_uid(&self) -> Option<CardUid> {
        match self {
            CardEvent::Confirmed(uid) => Some(*uid),
            _ => None,
        }
    }
}
