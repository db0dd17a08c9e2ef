//! Hardware abstraction traits
//!
//! These traits define the interface between the terminal logic and the
//! driver implementations for the reader, modem, GPS, display, lock,
//! battery gauge and clock.

pub mod battery;
pub mod card;
pub mod clock;
pub mod display;
pub mod lock;
pub mod modem;
pub mod position;

pub use battery::BatteryGauge;
pub use card::CardReader;
pub use clock::Clock;
pub use display::{DisplayError, StatusDisplay};
pub use lock::LockActuator;
pub use modem::Modem;
pub use position::PositionSource;
