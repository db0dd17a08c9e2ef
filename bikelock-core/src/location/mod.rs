//! Location update scheduling
//!
//! Decides when the terminal samples its position and runs the time-boxed
//! GPS acquisition.

pub mod fix;
pub mod scheduler;

pub use fix::{Fix, NO_FIX};
pub use scheduler::{LocationScheduler, ScheduleConfig, ScheduleState};
