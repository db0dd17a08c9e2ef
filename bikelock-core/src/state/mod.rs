//! Rental state
//!
//! The rental phase gates everything else on the terminal: which card
//! events lead to a request, and how often the position is reported.
//! Only the terminal loop changes it, and only through events.

pub mod events;
pub mod rental;

pub use events::RentalEvent;
pub use rental::{RentalPhase, RentalState};
