//! Bike-share server protocol
//!
//! This crate defines the wire format spoken between the lock terminal and
//! the rental server. Requests are HTTP GETs with the intent encoded in the
//! query string; replies are small JSON objects.
//!
//! # Protocol Overview
//!
//! ```text
//! terminal ── GET <url>?get1=state=10,bikeID=7,cardSerial=305419896 ──▶ server
//! terminal ◀── {"state":110,"userID":"u1","balance":"5.00","duration":""} ── server
//! ```
//!
//! Response codes are split into two bands. The information band (1xx–4xx)
//! is what the server decided. The transport band (9xx) is produced only by
//! the terminal when no usable reply arrived.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod codes;
pub mod reply;
pub mod request;

pub use codes::{RequestCode, ResponseBand, ResponseCode};
pub use reply::{
    decode, DecodeError, DecodePolicy, DetailString, RideDetails, ResponseOutcome,
    TransportError,
};
pub use request::{CardUid, Endpoint, RequestError, RequestIntent, RequestUrl, MAX_URL_LEN};
