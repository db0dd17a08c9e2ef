//! Server communication over the cellular modem
//!
//! [`HttpCom`] turns a [`RequestIntent`](bikelock_protocol::RequestIntent)
//! into one HTTP GET, walks the modem through the bearer and HTTP setup
//! steps, and decodes the reply into a typed outcome.

pub mod client;
pub mod step;

pub use client::{ComConfig, HttpCom, ServerUrl, DEFAULT_SERVER_URL, REPLY_BUF_LEN};
pub use step::TransportStep;
