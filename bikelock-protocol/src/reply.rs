//! Server reply decoding
//!
//! The modem hands back whatever the HTTP read returned, which may include
//! echo or status noise around the JSON body. The decoder takes the span
//! from the first `{` to the last `}` and validates it against a fixed
//! schema: an integer `state`, plus `userID`/`balance`/`duration` strings
//! for the two ride success codes. Unknown keys and unknown codes are
//! rejected.

use heapless::String;
use serde::Deserialize;

use crate::codes::{ResponseBand, ResponseCode};

/// Maximum length of each ride detail string
pub const MAX_DETAIL_LEN: usize = 32;

/// Fixed-capacity string for ride details
pub type DetailString = String<MAX_DETAIL_LEN>;

/// Errors that can occur while decoding a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// No `{...}` span in the reply
    NoObject,
    /// Span is not a valid reply object
    Malformed,
    /// Ride success code without user, balance and duration
    MissingDetails,
    /// `state` is not a code the server is allowed to send
    UnknownCode(u16),
}

/// Decoder options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodePolicy {
    /// Accept 320 (location stored, vehicle unavailable) as a known code
    pub accept_unavailable_location: bool,
}

/// Ride information returned with rent and return success
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RideDetails {
    /// Card holder identifier
    pub user_id: DetailString,
    /// Remaining account balance, as formatted by the server
    pub balance: DetailString,
    /// Ride duration, as formatted by the server (empty on rent)
    pub duration: DetailString,
}

/// Failures detected on the terminal side of the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Request status was malformed
    Status,
    /// A modem step failed or timed out
    RequestOvertime,
    /// The reply was empty
    InvalidResponse,
    /// The reply could not be decoded
    Decode,
}

impl TransportError {
    /// Response code reported for this error
    pub const fn code(self) -> ResponseCode {
        match self {
            TransportError::Status => ResponseCode::ErrorStatus,
            TransportError::RequestOvertime => ResponseCode::ErrorRequestOvertime,
            TransportError::InvalidResponse => ResponseCode::ErrorInvalidResponse,
            TransportError::Decode => ResponseCode::ErrorDecode,
        }
    }
}

/// Typed result of one request
///
/// Ride details only exist on the two ride success variants; transport
/// errors never carry server data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseOutcome {
    /// Rental started
    RentSuccess(RideDetails),
    /// Rental ended
    ReturnSuccess(RideDetails),
    /// Any other information-layer code
    Server(ResponseCode),
    /// The request did not produce a usable reply
    Transport(TransportError),
}

impl ResponseOutcome {
    /// Response code for this outcome
    pub fn code(&self) -> ResponseCode {
        match self {
            ResponseOutcome::RentSuccess(_) => ResponseCode::RentSuccess,
            ResponseOutcome::ReturnSuccess(_) => ResponseCode::ReturnSuccess,
            ResponseOutcome::Server(code) => *code,
            ResponseOutcome::Transport(err) => err.code(),
        }
    }

    /// Ride details, if this is a ride success
    pub fn details(&self) -> Option<&RideDetails> {
        match self {
            ResponseOutcome::RentSuccess(details) | ResponseOutcome::ReturnSuccess(details) => {
                Some(details)
            }
            _ => None,
        }
    }

    /// Transport error, if the request failed locally
    pub fn transport_error(&self) -> Option<TransportError> {
        match self {
            ResponseOutcome::Transport(err) => Some(*err),
            _ => None,
        }
    }

    /// Check if the outcome is in the transport band
    pub fn is_transport_error(&self) -> bool {
        self.code().band() == ResponseBand::Transport
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReply {
    state: u16,
    #[serde(rename = "userID")]
    user_id: Option<DetailString>,
    balance: Option<DetailString>,
    duration: Option<DetailString>,
}

/// Locate the outermost `{...}` span in a raw reply
pub fn object_span(raw: &[u8]) -> Option<&[u8]> {
    let start = raw.iter().position(|&b| b == b'{')?;
    let end = raw.iter().rposition(|&b| b == b'}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Decode a raw modem reply into an outcome
pub fn decode(raw: &[u8], policy: DecodePolicy) -> Result<ResponseOutcome, DecodeError> {
    let span = object_span(raw).ok_or(DecodeError::NoObject)?;
    let reply: RawReply = serde_json::from_slice(span).map_err(|_| DecodeError::Malformed)?;

    let code = ResponseCode::from_u16(reply.state).ok_or(DecodeError::UnknownCode(reply.state))?;

    // Client-local codes are never valid on the wire
    if code.band() == ResponseBand::Transport {
        return Err(DecodeError::UnknownCode(reply.state));
    }
    if code == ResponseCode::LocationSuccessNotAvailable && !policy.accept_unavailable_location {
        return Err(DecodeError::UnknownCode(reply.state));
    }

    if code.carries_details() {
        let details = match (reply.user_id, reply.balance, reply.duration) {
            (Some(user_id), Some(balance), Some(duration)) => RideDetails {
                user_id,
                balance,
                duration,
            },
            _ => return Err(DecodeError::MissingDetails),
        };
        return Ok(match code {
            ResponseCode::RentSuccess => ResponseOutcome::RentSuccess(details),
            _ => ResponseOutcome::ReturnSuccess(details),
        });
    }

    Ok(ResponseOutcome::Server(code))
}
