//! Status display trait

use bikelock_protocol::ResponseOutcome;

use crate::card::CardEvent;

/// Errors that can occur with the status display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication with the panel failed
    Communication,
    /// Panel not initialized
    NotInitialized,
}

/// Trait for the rider-facing display
///
/// The display only renders; what to show is decided by the terminal loop.
pub trait StatusDisplay {
    /// Show a "please wait" message while a request runs
    fn show_wait(&mut self) -> Result<(), DisplayError>;

    /// Show the result of a request
    ///
    /// Ride success outcomes also show the rider's details.
    fn show_outcome(&mut self, outcome: &ResponseOutcome) -> Result<(), DisplayError>;

    /// Show a card event
    fn show_card_event(&mut self, event: CardEvent) -> Result<(), DisplayError>;

    /// Clear the display
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Check if something is currently shown
    fn is_displaying(&self) -> bool;
}
