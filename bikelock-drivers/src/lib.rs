//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in bikelock-core for the terminal's simple peripherals:
//!
//! - Lock release (GPIO-driven solenoid or motor)
//! - Battery gauge (ADC behind a voltage divider)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod battery;
pub mod lock;
