//! Battery gauge trait

/// Trait for reading the terminal battery level
pub trait BatteryGauge {
    /// Error type for gauge reads
    type Error;

    /// Read the battery level in percent (0.0 to 100.0)
    fn level_percent(&mut self) -> Result<f32, Self::Error>;
}
