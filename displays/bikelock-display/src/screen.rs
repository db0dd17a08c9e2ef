//! Screen buffer types
//!
//! Provides a character-based screen buffer for text-mode displays.

use heapless::String;

use crate::backend::DisplayBackend;
use bikelock_core::traits::DisplayError;

/// Number of character rows on the panel
pub const SCREEN_ROWS: usize = 4;

/// Number of character columns on the panel
pub const SCREEN_COLS: usize = 20;

/// Maximum characters per line
pub const LINE_LEN: usize = SCREEN_COLS;

/// Screen buffer for text-mode displays
///
/// Holds the text to show and renders it to any `DisplayBackend`
/// implementation when it changed.
#[derive(Clone)]
pub struct Screen {
    /// Current display content
    lines: [String<LINE_LEN>; SCREEN_ROWS],
    /// Whether the screen needs to be redrawn
    dirty: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a new empty screen
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| String::new()),
            dirty: true,
        }
    }

    /// Clear the entire screen
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.dirty = true;
    }

    /// Set the content of a specific row
    ///
    /// Text longer than a row is cut at the last whole character that fits.
    pub fn set_line(&mut self, row: usize, text: &str) {
        if let Some(line) = self.lines.get_mut(row) {
            line.clear();
            for c in text.chars() {
                if line.push(c).is_err() {
                    break;
                }
            }
            self.dirty = true;
        }
    }

    /// Get the content of a specific row
    pub fn get_line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    /// Check if every row is empty
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }

    /// Check if screen needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark screen as clean (after rendering)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Get all lines as an iterator
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }

    /// Draw the buffer to a backend if it changed
    pub fn render<B: DisplayBackend>(&mut self, backend: &mut B) -> Result<(), DisplayError> {
        if !backend.is_ready() {
            return Err(DisplayError::NotInitialized);
        }
        if !self.dirty {
            return Ok(());
        }

        backend.clear()?;
        for (row, line) in self.lines.iter().enumerate() {
            if !line.is_empty() {
                backend.draw_text(row as u8, 0, line)?;
            }
        }
        backend.flush()?;
        self.mark_clean();
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Screen {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Screen[");
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "{}", line.as_str());
        }
        defmt::write!(f, "]");
    }
}
