//! Text status panel
//!
//! Renders the terminal's messages on a character display. Request
//! results stay on screen for a fixed time and are then cleared; the wait
//! message and card errors stay until the terminal clears them at the end
//! of its poll cycle.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use heapless::String;

use bikelock_core::card::CardEvent;
use bikelock_core::traits::{DisplayError, StatusDisplay};
use bikelock_protocol::{ResponseOutcome, RideDetails};

use crate::backend::DisplayBackend;
use crate::messages::{Message, WAIT};
use crate::screen::Screen;

/// How long a result message stays on screen (ms)
pub const MESSAGE_HOLD_MS: u32 = 5000;

/// How long ride details stay on screen (ms)
pub const DETAILS_HOLD_MS: u32 = 10_000;

/// Row used for single-line messages
const CENTER_ROW: usize = 1;

/// Character panel implementing [`StatusDisplay`]
pub struct TextPanel<B, D> {
    backend: B,
    delay: D,
    screen: Screen,
    displaying: bool,
    message_hold_ms: u32,
    details_hold_ms: u32,
}

impl<B: DisplayBackend, D: DelayNs> TextPanel<B, D> {
    /// Create a panel with the default hold times
    pub fn new(backend: B, delay: D) -> Self {
        Self::with_hold_times(backend, delay, MESSAGE_HOLD_MS, DETAILS_HOLD_MS)
    }

    /// Create a panel with custom hold times
    pub fn with_hold_times(
        backend: B,
        delay: D,
        message_hold_ms: u32,
        details_hold_ms: u32,
    ) -> Self {
        Self {
            backend,
            delay,
            screen: Screen::new(),
            displaying: false,
            message_hold_ms,
            details_hold_ms,
        }
    }

    /// Screen buffer
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Display backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn show_message(&mut self, msg: Message) -> Result<(), DisplayError> {
        self.screen.clear();
        match msg.detail {
            Some(detail) => {
                self.screen.set_line(CENTER_ROW, msg.title);
                self.screen.set_line(CENTER_ROW + 1, detail);
            }
            None => self.screen.set_line(CENTER_ROW, msg.title),
        }
        self.present()
    }

    fn show_details(
        &mut self,
        msg: Message,
        details: &RideDetails,
        with_duration: bool,
    ) -> Result<(), DisplayError> {
        self.screen.clear();
        self.screen.set_line(0, msg.title);
        self.set_field(1, "ID: ", &details.user_id);
        self.set_field(2, "Balance: ", &details.balance);
        if with_duration {
            self.set_field(3, "Duration: ", &details.duration);
        }
        self.present()
    }

    fn set_field(&mut self, row: usize, label: &str, value: &str) {
        let mut line: String<64> = String::new();
        // Overflow only cuts the value short; the screen truncates anyway
        let _ = write!(line, "{}{}", label, value);
        self.screen.set_line(row, &line);
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        self.displaying = true;
        self.screen.render(&mut self.backend)
    }

    /// Keep the current content up for `ms`, then clear it
    fn hold(&mut self, ms: u32) -> Result<(), DisplayError> {
        self.delay.delay_ms(ms);
        self.clear()
    }
}

impl<B: DisplayBackend, D: DelayNs> StatusDisplay for TextPanel<B, D> {
    fn show_wait(&mut self) -> Result<(), DisplayError> {
        self.show_message(Message {
            title: WAIT,
            detail: None,
        })
    }

    fn show_outcome(&mut self, outcome: &ResponseOutcome) -> Result<(), DisplayError> {
        let msg = Message::for_code(outcome.code());
        match outcome {
            ResponseOutcome::RentSuccess(details) => {
                self.show_details(msg, details, false)?;
                self.hold(self.details_hold_ms)
            }
            ResponseOutcome::ReturnSuccess(details) => {
                self.show_details(msg, details, true)?;
                self.hold(self.details_hold_ms)
            }
            _ => {
                self.show_message(msg)?;
                self.hold(self.message_hold_ms)
            }
        }
    }

    fn show_card_event(&mut self, event: CardEvent) -> Result<(), DisplayError> {
        match Message::for_card_event(event) {
            Some(msg) => self.show_message(msg),
            None => Ok(()),
        }
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.displaying = false;
        self.screen.clear();
        self.backend.clear()?;
        self.backend.flush()?;
        self.screen.mark_clean();
        Ok(())
    }

    fn is_displaying(&self) -> bool {
        self.displaying
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bikelock_protocol::{ResponseCode, TransportError};
    use heapless::String as HString;
    use std::string::String as StdString;
    use std::vec::Vec;

    /// Backend recording the text on each row
    struct MockBackend {
        rows: [StdString; 4],
        flushes: u32,
        ready: bool,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                rows: Default::default(),
                flushes: 0,
                ready: true,
            }
        }

        fn text(&self) -> Vec<&str> {
            self.rows.iter().map(|r| r.as_str()).collect()
        }
    }

    impl DisplayBackend for MockBackend {
        fn clear(&mut self) -> Result<(), DisplayError> {
            for row in &mut self.rows {
                row.clear();
            }
            Ok(())
        }

        fn draw_text(&mut self, row: u8, _col: u8, text: &str) -> Result<(), DisplayError> {
            self.rows[row as usize] = text.into();
            Ok(())
        }

        fn flush(&mut self) -> Result<(), DisplayError> {
            self.flushes += 1;
            Ok(())
        }

        fn dimensions(&self) -> (u8, u8) {
            (20, 4)
        }

        fn is_ready(&self) -> bool {
            self.ready
        }
    }

    /// Delay recording every wait
    #[derive(Default)]
    struct MockDelay {
        waits: Vec<u32>,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.waits.push(ns / 1_000_000);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.waits.push(ms);
        }
    }

    fn panel() -> TextPanel<MockBackend, MockDelay> {
        TextPanel::new(MockBackend::new(), MockDelay::default())
    }

    fn details(user: &str, balance: &str, duration: &str) -> RideDetails {
        RideDetails {
            user_id: HString::try_from(user).unwrap(),
            balance: HString::try_from(balance).unwrap(),
            duration: HString::try_from(duration).unwrap(),
        }
    }

    #[test]
    fn test_wait_stays_up() {
        let mut p = panel();
        p.show_wait().unwrap();
        assert!(p.is_displaying());
        assert_eq!(p.backend().text(), ["", "Please Wait!", "", ""]);
        assert!(p.delay.waits.is_empty());
    }

    #[test]
    fn test_failure_held_then_cleared() {
        let mut p = panel();
        let outcome = ResponseOutcome::Server(ResponseCode::RentFailNegativeBalance);
        p.show_outcome(&outcome).unwrap();

        assert_eq!(p.delay.waits, [MESSAGE_HOLD_MS]);
        assert!(!p.is_displaying());
        assert!(p.screen().is_blank());
    }

    #[test]
    fn test_rent_details_layout() {
        let mut p = panel();
        let outcome = ResponseOutcome::RentSuccess(details("2015001", "12.50", ""));
        p.show_details(Message::for_code(outcome.code()), outcome.details().unwrap(), false)
            .unwrap();

        assert_eq!(
            p.backend().text(),
            ["Borrow Succeed!", "ID: 2015001", "Balance: 12.50", ""]
        );
    }

    #[test]
    fn test_return_details_held_longer() {
        let mut p = panel();
        let outcome = ResponseOutcome::ReturnSuccess(details("2015001", "11.50", "00:25"));
        p.show_outcome(&outcome).unwrap();

        assert_eq!(p.delay.waits, [DETAILS_HOLD_MS]);
        assert!(!p.is_displaying());
    }

    #[test]
    fn test_return_details_layout() {
        let mut p = panel();
        let d = details("2015001", "11.50", "00:25");
        p.show_details(Message::for_code(ResponseCode::ReturnSuccess), &d, true)
            .unwrap();
        assert_eq!(p.backend().text()[3], "Duration: 00:25");
    }

    #[test]
    fn test_transport_error_message() {
        let mut p = panel();
        p.show_message(Message::for_code(
            ResponseOutcome::Transport(TransportError::RequestOvertime).code(),
        ))
        .unwrap();
        assert_eq!(p.backend().text(), ["", "Error!", "Comm. Overtime!", ""]);
    }

    #[test]
    fn test_card_event_until_cleared() {
        let mut p = panel();
        p.show_card_event(CardEvent::ErrorCardChanged).unwrap();
        assert!(p.is_displaying());
        assert_eq!(p.backend().text()[2], "Card changed!");

        p.clear().unwrap();
        assert!(!p.is_displaying());
        assert_eq!(p.backend().text(), ["", "", "", ""]);
    }

    #[test]
    fn test_silent_card_event() {
        let mut p = panel();
        p.show_card_event(CardEvent::Detached).unwrap();
        assert!(!p.is_displaying());
        assert_eq!(p.backend().flushes, 0);
    }

    #[test]
    fn test_backend_not_ready() {
        let mut p = panel();
        p.backend.ready = false;
        assert_eq!(p.show_wait(), Err(DisplayError::NotInitialized));
    }
}
