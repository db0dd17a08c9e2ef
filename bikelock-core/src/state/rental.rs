//! Rental phase definition
//!
//! Card handling and location scheduling read the phase; only
//! [`RentalState::apply`] and [`RentalState::set_phase`] change it.

use super::events::RentalEvent;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rental phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RentalPhase {
    /// Vehicle out of service; no rentals, slower position reports
    Unavailable,
    /// Parked and free to rent
    #[default]
    Idle,
    /// Rent request in flight
    RentInProgress,
    /// Ridden by a card holder
    Rented,
    /// Return request in flight
    ReturnInProgress,
}

impl RentalPhase {
    /// Check if a presented card may start a request
    pub fn allows_rental(&self) -> bool {
        !matches!(self, RentalPhase::Unavailable)
    }

    /// Check if a request is in flight
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            RentalPhase::RentInProgress | RentalPhase::ReturnInProgress
        )
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: RentalEvent) -> Self {
        use RentalEvent::*;
        use RentalPhase::*;

        match (self, event) {
            // Idle transitions
            (Idle, RentRequested) => RentInProgress,
            (Idle, MarkedUnavailable) => Unavailable,

            // RentInProgress transitions
            (RentInProgress, RentGranted) => Rented,
            (RentInProgress, RentRefused) => Idle,
            (RentInProgress, RequestFailed) => Idle,

            // Rented transitions
            (Rented, ReturnRequested) => ReturnInProgress,

            // ReturnInProgress transitions
            (ReturnInProgress, ReturnAccepted) => Idle,
            (ReturnInProgress, ReturnRefused) => Rented,
            (ReturnInProgress, RequestFailed) => Rented,

            // Unavailable transitions
            (Unavailable, MarkedAvailable) => Idle,

            // Default: stay in current phase
            _ => self,
        }
    }
}

/// Holder for the terminal's rental phase
#[derive(Debug, Clone, Default)]
pub struct RentalState {
    phase: RentalPhase,
}

impl RentalState {
    /// Create a rental state starting in `phase`
    pub const fn new(phase: RentalPhase) -> Self {
        Self { phase }
    }

    /// Current phase
    pub fn phase(&self) -> RentalPhase {
        self.phase
    }

    /// Force the phase (boot-time provisioning)
    pub fn set_phase(&mut self, phase: RentalPhase) {
        self.phase = phase;
    }

    /// Check if the vehicle can be rented at all
    pub fn is_available(&self) -> bool {
        self.phase.allows_rental()
    }

    /// Apply an event, returning the new phase
    pub fn apply(&mut self, event: RentalEvent) -> RentalPhase {
        self.phase = self.phase.transition(event);
        self.phase
    }
}
