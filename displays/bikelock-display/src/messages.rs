//! Rider messages
//!
//! Every reply code and card error maps to a fixed one- or two-line
//! message. Lines fit the 20-column panel.

use bikelock_core::card::CardEvent;
use bikelock_protocol::ResponseCode;

/// Heading shown above failure details
pub const ERROR_TITLE: &str = "Error!";

/// Shown while a request runs
pub const WAIT: &str = "Please Wait!";

/// A message for the rider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    /// First line
    pub title: &'static str,
    /// Optional second line
    pub detail: Option<&'static str>,
}

impl Message {
    const fn info(title: &'static str) -> Self {
        Self {
            title,
            detail: None,
        }
    }

    const fn error(detail: &'static str) -> Self {
        Self {
            title: ERROR_TITLE,
            detail: Some(detail),
        }
    }

    /// Message for a reply code
    pub const fn for_code(code: ResponseCode) -> Self {
        match code {
            ResponseCode::RentSuccess => Self::info("Borrow Succeed!"),
            ResponseCode::RentFailUserOccupied => Self::error("User is occupied!"),
            ResponseCode::RentFailUserNonexistent => Self::error("No user info!"),
            ResponseCode::RentFailNegativeBalance => Self::error("No balance!"),
            ResponseCode::RentFailBikeOccupied => Self::error("Bike is occupied!"),
            ResponseCode::RentFailBikeUnavailable => Self::error("Bike unavailable!"),
            ResponseCode::ReturnSuccess => Self::info("Return Succeed!"),
            ResponseCode::ReturnFailUserNotMatch => Self::error("Not your rental!"),
            ResponseCode::ReturnFailOrderNonexistent => Self::error("No open rental!"),
            ResponseCode::LocationSuccess | ResponseCode::LocationSuccessNotAvailable => {
                Self::info("Locating Succeed!")
            }
            ResponseCode::LocationFail => Self::error("Locating Fail!"),
            ResponseCode::LowBatterySuccess => Self::info("Low Battery Sent!"),
            ResponseCode::LowBatteryFail => Self::error("Low Battery!"),
            ResponseCode::ErrorRequestOvertime => Self::error("Comm. Overtime!"),
            ResponseCode::ErrorStatus
            | ResponseCode::ErrorInvalidResponse
            | ResponseCode::ErrorDecode => Self::error("Comm. Error!"),
            ResponseCode::ErrorOther => Self::error("Unknown Error!"),
        }
    }

    /// Message for a card event the terminal shows to the rider
    ///
    /// Only the error events produce a message.
    pub const fn for_card_event(event: CardEvent) -> Option<Self> {
        let msg = match event {
            CardEvent::ErrorCardChanged => Self::error("Card changed!"),
            CardEvent::ErrorVehicleUnavailable => Self::error("Bike unavailable!"),
            CardEvent::None
            | CardEvent::Detected
            | CardEvent::ReadInterrupted
            | CardEvent::Confirmed(_)
            | CardEvent::SameCardAgain
            | CardEvent::Detached
            | CardEvent::DetachConfirmed => return None,
        };
        Some(msg)
    }
}
