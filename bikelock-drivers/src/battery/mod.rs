//! Battery gauge drivers

pub mod adc;

pub use adc::{AdcBattery, AdcReader, BatteryError};
