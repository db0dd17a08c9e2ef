//! Card presence detection
//!
//! Turns noisy per-poll reader samples into discrete card events.

pub mod detector;
pub mod events;

pub use detector::{CardDetector, CardSessionState, DebounceConfig};
pub use events::CardEvent;
