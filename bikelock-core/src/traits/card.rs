//! RFID card reader trait

use bikelock_protocol::CardUid;

/// Trait for the RFID reader
///
/// Implementations wrap the reader's bit-level card polling.
pub trait CardReader {
    /// Check if a card answers in the field
    fn poll_present(&mut self) -> bool;

    /// Read the serial number of the card in the field
    ///
    /// Returns `None` if the read failed.
    fn read_uid(&mut self) -> Option<CardUid>;

    /// Put the card in the field to sleep until the next poll cycle
    fn halt(&mut self) {}
}
