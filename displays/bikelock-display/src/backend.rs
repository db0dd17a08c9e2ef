//! Display backend trait
//!
//! Defines the interface for different display types.

use bikelock_core::traits::DisplayError;

/// Display backend trait
///
/// Provides a hardware-agnostic interface for rendering text.
/// Implementations handle the specifics of OLED, LCD, or other display types.
pub trait DisplayBackend {
    /// Clear the entire display
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw text at the specified row and column
    ///
    /// - `row`: Row number (0-based)
    /// - `col`: Column number in characters (0-based)
    /// - `text`: Text to display
    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError>;

    /// Flush buffered content to the display
    ///
    /// For displays with internal buffers, this sends the buffer to the hardware.
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Get the display dimensions
    ///
    /// Returns (columns, rows) in character units
    fn dimensions(&self) -> (u8, u8);

    /// Check if the display is ready
    fn is_ready(&self) -> bool;
}
