//! Wire command builder
//!
//! A request is a plain HTTP GET whose query string carries the intent:
//!
//! ```text
//! <server url>?get<N>=state=<code>,bikeID=<id>,<key>=<value>[,<key>=<value>...]
//! ```
//!
//! `N` selects the server handler: 1 for rent/return, 2 for location,
//! 3 for location failure and low battery. Key order is fixed per intent.

use core::fmt::{self, Write};

use heapless::String;

use crate::codes::RequestCode;

/// Maximum length of a complete request URL
pub const MAX_URL_LEN: usize = 192;

/// Complete request URL handed to the modem
pub type RequestUrl = String<MAX_URL_LEN>;

// Query keys
pub const KEY_STATE: &str = "state";
pub const KEY_BIKE_ID: &str = "bikeID";
pub const KEY_CARD_SERIAL: &str = "cardSerial";
pub const KEY_LONGITUDE: &str = "longitude";
pub const KEY_LATITUDE: &str = "latitude";
pub const KEY_BATTERY_LEVEL: &str = "batteryLevel";

/// Errors that can occur while building a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Server URL plus query does not fit in [`MAX_URL_LEN`]
    UrlTooLong,
}

/// Serial number read from an access card
///
/// Zero is reserved by the reader for "no card", so a `CardUid` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CardUid(u32);

impl CardUid {
    /// Wrap a raw serial number, rejecting zero
    pub const fn new(raw: u32) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Raw serial number
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Server handler selected by the `get<N>` query key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endpoint {
    /// `?get1=` rent and return
    RentReturn,
    /// `?get2=` location report
    Location,
    /// `?get3=` location failure and battery report
    Battery,
}

impl Endpoint {
    /// Query prefix including the leading `?`
    pub const fn prefix(self) -> &'static str {
        match self {
            Endpoint::RentReturn => "?get1=",
            Endpoint::Location => "?get2=",
            Endpoint::Battery => "?get3=",
        }
    }
}

/// Something the terminal wants to tell the server
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestIntent {
    /// Start a rental with the presented card
    Rent { bike_id: u32, card: CardUid },
    /// End the rental held by the presented card
    Return { bike_id: u32, card: CardUid },
    /// Periodic position report
    ReportLocation {
        bike_id: u32,
        longitude: f32,
        latitude: f32,
        battery: f32,
    },
    /// Position could not be acquired this period
    ReportLocationFailed { bike_id: u32, battery: f32 },
    /// Battery dropped below the warning level
    ReportLowBattery { bike_id: u32, battery: f32 },
}

impl RequestIntent {
    /// Request code for this intent
    pub fn code(&self) -> RequestCode {
        match self {
            RequestIntent::Rent { .. } => RequestCode::Rent,
            RequestIntent::Return { .. } => RequestCode::Return,
            RequestIntent::ReportLocation { .. } => RequestCode::Location,
            RequestIntent::ReportLocationFailed { .. } => RequestCode::LocationFail,
            RequestIntent::ReportLowBattery { .. } => RequestCode::LowBattery,
        }
    }

    /// Server handler for this intent
    pub fn endpoint(&self) -> Endpoint {
        match self {
            RequestIntent::Rent { .. } | RequestIntent::Return { .. } => Endpoint::RentReturn,
            RequestIntent::ReportLocation { .. } => Endpoint::Location,
            RequestIntent::ReportLocationFailed { .. } | RequestIntent::ReportLowBattery { .. } => {
                Endpoint::Battery
            }
        }
    }

    /// Bike the request is about
    pub fn bike_id(&self) -> u32 {
        match *self {
            RequestIntent::Rent { bike_id, .. }
            | RequestIntent::Return { bike_id, .. }
            | RequestIntent::ReportLocation { bike_id, .. }
            | RequestIntent::ReportLocationFailed { bike_id, .. }
            | RequestIntent::ReportLowBattery { bike_id, .. } => bike_id,
        }
    }

    /// Write the query string (starting at `?get<N>=`) into `out`
    pub fn write_query<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str(self.endpoint().prefix())?;
        write!(out, "{}={},", KEY_STATE, self.code().to_u16())?;
        write!(out, "{}={}", KEY_BIKE_ID, self.bike_id())?;

        match *self {
            RequestIntent::Rent { card, .. } | RequestIntent::Return { card, .. } => {
                write!(out, ",{}={}", KEY_CARD_SERIAL, card.get())
            }
            RequestIntent::ReportLocation {
                longitude,
                latitude,
                battery,
                ..
            } => {
                write!(out, ",{}={:.6}", KEY_LONGITUDE, longitude)?;
                write!(out, ",{}={:.6}", KEY_LATITUDE, latitude)?;
                write!(out, ",{}={:.2}", KEY_BATTERY_LEVEL, battery)
            }
            RequestIntent::ReportLocationFailed { battery, .. }
            | RequestIntent::ReportLowBattery { battery, .. } => {
                write!(out, ",{}={:.2}", KEY_BATTERY_LEVEL, battery)
            }
        }
    }

    /// Build the full request URL against `server_url`
    pub fn to_url(&self, server_url: &str) -> Result<RequestUrl, RequestError> {
        let mut url = RequestUrl::new();
        url.push_str(server_url)
            .map_err(|_| RequestError::UrlTooLong)?;
        self.write_query(&mut url)
            .map_err(|_| RequestError::UrlTooLong)?;
        Ok(url)
    }
}
