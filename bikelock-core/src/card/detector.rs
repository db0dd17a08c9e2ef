//! Debounced card presence state machine
//!
//! The reader answers every poll with "card present, here is its UID" or
//! nothing. RF noise and a badly placed card make single samples
//! unreliable, so the detector only confirms a card after it has been read
//! on more than `read_threshold` consecutive polls, and only treats it as
//! removed after more than `detach_threshold` consecutive empty polls.
//!
//! ```text
//!            seen              seen × N
//!  NoCard ─────────▶ Reading ───────────▶ Confirmed
//!    ▲                 │  ▲                  │
//!    │ gone × M        │  │ seen             │ gone
//!    └──────────── Detaching ◀───────────────┘
//! ```

use bikelock_protocol::CardUid;

use super::events::CardEvent;
use crate::state::RentalPhase;
use crate::traits::CardReader;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Consecutive reads required (exclusive) before a card is confirmed
pub const READ_THRESHOLD: u8 = 3;

/// Consecutive misses required (exclusive) before a card is considered gone
pub const DETACH_THRESHOLD: u8 = 5;

/// Debounce thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DebounceConfig {
    /// Reads beyond which a card is confirmed
    pub read_threshold: u8,
    /// Misses beyond which a card is considered removed
    pub detach_threshold: u8,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            read_threshold: READ_THRESHOLD,
            detach_threshold: DETACH_THRESHOLD,
        }
    }
}

/// Card session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CardSessionState {
    /// No card in the field
    NoCard,
    /// A card is answering but not yet confirmed
    Reading,
    /// A card has been read consistently
    Confirmed,
    /// The card stopped answering
    Detaching,
}

/// Card presence detector
#[derive(Debug, Clone)]
pub struct CardDetector {
    config: DebounceConfig,
    state: CardSessionState,
    /// Consecutive reads or misses, depending on state
    counter: u8,
    /// Last confirmed card
    confirmed: Option<CardUid>,
    /// Card most recently read in this session
    candidate: Option<CardUid>,
}

impl Default for CardDetector {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

impl CardDetector {
    /// Create a detector with the given thresholds
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            state: CardSessionState::NoCard,
            counter: 0,
            confirmed: None,
            candidate: None,
        }
    }

    /// Current session state
    pub fn state(&self) -> CardSessionState {
        self.state
    }

    /// Card held by the current session, if any
    pub fn uid(&self) -> Option<CardUid> {
        self.candidate.or(self.confirmed)
    }

    /// Last confirmed card, if any
    pub fn confirmed_uid(&self) -> Option<CardUid> {
        self.confirmed
    }

    /// Check if a card session is in progress
    pub fn is_active(&self) -> bool {
        self.state != CardSessionState::NoCard
    }

    /// Sample the reader once and evaluate the result
    pub fn poll<R: CardReader>(&mut self, reader: &mut R, phase: RentalPhase) -> CardEvent {
        let present = reader.poll_present();
        let uid = if present { reader.read_uid() } else { None };
        self.evaluate(present, uid, phase)
    }

    /// Evaluate one reader sample
    ///
    /// A card counts as seen only if it is present and its UID was read.
    /// While the vehicle is unavailable a seen card leaves the session
    /// untouched and reports [`CardEvent::ErrorVehicleUnavailable`].
    pub fn evaluate(
        &mut self,
        raw_present: bool,
        raw_uid: Option<CardUid>,
        phase: RentalPhase,
    ) -> CardEvent {
        match raw_uid.filter(|_| raw_present) {
            Some(_) if !phase.allows_rental() => CardEvent::ErrorVehicleUnavailable,
            Some(uid) => self.card_seen(uid),
            None => self.card_absent(),
        }
    }

    /// Forget the current session
    ///
    /// Only safe while no card is in the field and no rental is being
    /// negotiated: re-arming mid-session drops the confirmed card, and the
    /// next read of the same card will be reported as a new one.
    pub fn reset(&mut self) {
        self.state = CardSessionState::NoCard;
        self.counter = 0;
        self.confirmed = None;
        self.candidate = None;
    }

    fn card_seen(&mut self, uid: CardUid) -> CardEvent {
        match self.state {
            CardSessionState::NoCard => {
                self.counter = 1;
                self.candidate = Some(uid);
                self.state = CardSessionState::Reading;
                CardEvent::Detected
            }
            CardSessionState::Reading => {
                self.candidate = Some(uid);
                self.counter = self.counter.saturating_add(1);
                if self.counter <= self.config.read_threshold {
                    return CardEvent::None;
                }

                self.counter = 0;
                self.state = CardSessionState::Confirmed;
                if self.confirmed == Some(uid) {
                    CardEvent::SameCardAgain
                } else {
                    self.confirmed = Some(uid);
                    info!("card confirmed: {}", uid.get());
                    CardEvent::Confirmed(uid)
                }
            }
            CardSessionState::Confirmed => {
                if self.confirmed == Some(uid) {
                    return CardEvent::None;
                }
                warn!("card changed to {} while confirmed", uid.get());
                self.counter = 0;
                self.confirmed = Some(uid);
                self.candidate = Some(uid);
                self.state = CardSessionState::Reading;
                CardEvent::ErrorCardChanged
            }
            CardSessionState::Detaching => {
                self.counter = 1;
                self.candidate = Some(uid);
                self.state = CardSessionState::Reading;
                CardEvent::Detected
            }
        }
    }

    fn card_absent(&mut self) -> CardEvent {
        match self.state {
            CardSessionState::NoCard => CardEvent::None,
            CardSessionState::Reading => {
                self.counter = 1;
                self.state = CardSessionState::Detaching;
                CardEvent::Detached
            }
            CardSessionState::Confirmed => {
                self.counter = self.counter.saturating_add(1);
                self.state = CardSessionState::Detaching;
                CardEvent::Detached
            }
            CardSessionState::Detaching => {
                self.counter = self.counter.saturating_add(1);
                if self.counter <= self.config.detach_threshold {
                    return CardEvent::None;
                }

                let had_card = self.confirmed.is_some();
                self.reset();
                if had_card {
                    debug!("card removal confirmed");
                    CardEvent::DetachConfirmed
                } else {
                    CardEvent::ReadInterrupted
                }
            }
        }
    }
}
