//! Board-agnostic core logic for the bike-share lock terminal
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (reader, modem, GPS, display, lock)
//! - Debounced card presence detection
//! - Rental phase tracking
//! - Location report scheduling
//! - Server communication over the modem
//! - The terminal poll loop
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible in every module
mod fmt;

pub mod card;
pub mod clock;
pub mod comm;
pub mod config;
pub mod location;
pub mod state;
pub mod terminal;
pub mod traits;

#[cfg(test)]
mod mock;

pub use terminal::{CycleReport, Hardware, LocationReport, Terminal};
