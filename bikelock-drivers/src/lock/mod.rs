//! Lock release drivers

pub mod gpio;

pub use gpio::{GpioLock, LockError};
