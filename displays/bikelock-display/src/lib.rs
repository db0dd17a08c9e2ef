//! Rider-facing display for the bike-share lock terminal
//!
//! This crate provides:
//! - `DisplayBackend` trait for different character displays (OLED, LCD)
//! - `Screen` buffer rendered to any backend
//! - Fixed rider messages for every reply code and card error
//! - `TextPanel`, the terminal's `StatusDisplay` implementation
//!
//! # Architecture
//!
//! The terminal loop decides what to show and calls the `StatusDisplay`
//! methods. `TextPanel` lays the message out on a `Screen`, renders it
//! through the backend, and holds results on screen long enough to read
//! before clearing them.

#![cfg_attr(not(test), no_std)]

pub mod backend;
pub mod messages;
pub mod panel;
pub mod screen;

// Re-export key types
pub use backend::DisplayBackend;
pub use bikelock_core::traits::DisplayError;
pub use messages::Message;
pub use panel::{TextPanel, DETAILS_HOLD_MS, MESSAGE_HOLD_MS};
pub use screen::{Screen, SCREEN_COLS, SCREEN_ROWS};
