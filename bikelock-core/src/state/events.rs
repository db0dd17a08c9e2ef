//! Events that move the rental phase

/// Events that can trigger rental phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RentalEvent {
    // Card-initiated events
    /// A confirmed card asked to rent an idle bike
    RentRequested,
    /// A confirmed card asked to return a rented bike
    ReturnRequested,

    // Server replies
    /// Server accepted the rental
    RentGranted,
    /// Server refused the rental
    RentRefused,
    /// Server accepted the return
    ReturnAccepted,
    /// Server refused the return
    ReturnRefused,
    /// No usable reply arrived
    RequestFailed,

    // Availability
    /// Server reported the vehicle as unavailable
    MarkedUnavailable,
    /// Server reported the vehicle as available again
    MarkedAvailable,
}
