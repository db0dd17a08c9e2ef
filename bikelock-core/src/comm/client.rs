//! HTTP request client
//!
//! Every request runs the same modem sequence:
//!
//! ```text
//! attach bearer → open bearer → http init → bind bearer → set url
//!     → action → read → decode → http terminate → close bearer
//! ```
//!
//! Each step is gated on the previous one. Any failure stops the sequence,
//! records the step, and still tears down the HTTP service and bearer so
//! the modem is left idle for the next request. The modem needs a moment
//! between commands, so every step is followed by a settle delay.

use embedded_hal::delay::DelayNs;
use heapless::String;

use bikelock_protocol::{
    decode, CardUid, DecodePolicy, RequestIntent, ResponseOutcome, RideDetails, TransportError,
};

use super::step::TransportStep;
use crate::traits::Modem;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of the buffer the reply is read into
pub const REPLY_BUF_LEN: usize = 256;

/// Maximum length of the server URL
pub const MAX_SERVER_URL_LEN: usize = 128;

/// Server URL storage
pub type ServerUrl = String<MAX_SERVER_URL_LEN>;

/// Server URL used until one is provisioned
pub const DEFAULT_SERVER_URL: &str = "http://localhost/test.php";

/// Settle delay after ordinary modem commands
pub const SHORT_SETTLE_MS: u32 = 200;

/// Settle delay after opening the bearer
pub const LONG_SETTLE_MS: u32 = 1000;

/// Communication settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComConfig {
    /// Base URL every query string is appended to
    pub server_url: ServerUrl,
    /// Delay after each modem command (ms)
    pub short_settle_ms: u32,
    /// Delay after the bearer opens (ms)
    pub long_settle_ms: u32,
    /// Treat 320 as "location stored, vehicle unavailable"
    ///
    /// Off by default, in which case the server must not send it.
    pub distinct_unavailable_location_code: bool,
}

impl Default for ComConfig {
    fn default() -> Self {
        let mut server_url = ServerUrl::new();
        // Fits MAX_SERVER_URL_LEN
        let _ = server_url.push_str(DEFAULT_SERVER_URL);
        Self {
            server_url,
            short_settle_ms: SHORT_SETTLE_MS,
            long_settle_ms: LONG_SETTLE_MS,
            distinct_unavailable_location_code: false,
        }
    }
}

impl ComConfig {
    /// Decoder options implied by this configuration
    pub fn decode_policy(&self) -> DecodePolicy {
        DecodePolicy {
            accept_unavailable_location: self.distinct_unavailable_location_code,
        }
    }
}

/// Request client over a cellular modem
pub struct HttpCom<M: Modem, D: DelayNs> {
    modem: M,
    delay: D,
    config: ComConfig,
    /// Outcome of the last request
    outcome: Option<ResponseOutcome>,
    /// Set when the last request produced a decoded reply
    has_response: bool,
    failed_step: Option<TransportStep>,
    /// Set when closing the HTTP service or bearer failed after a reply
    teardown_failed: bool,
}

impl<M: Modem, D: DelayNs> HttpCom<M, D> {
    /// Create a client
    pub fn new(modem: M, delay: D, config: ComConfig) -> Self {
        Self {
            modem,
            delay,
            config,
            outcome: None,
            has_response: false,
            failed_step: None,
            teardown_failed: false,
        }
    }

    /// Communication settings
    pub fn config(&self) -> &ComConfig {
        &self.config
    }

    /// Delay source shared with other blocking waits
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    /// Modem, for diagnostics
    pub fn modem(&self) -> &M {
        &self.modem
    }

    /// Ask to start a rental
    pub fn request_rent(&mut self, bike_id: u32, card: CardUid) -> bool {
        self.execute(&RequestIntent::Rent { bike_id, card })
    }

    /// Ask to end a rental
    pub fn request_return(&mut self, bike_id: u32, card: CardUid) -> bool {
        self.execute(&RequestIntent::Return { bike_id, card })
    }

    /// Report the current position
    pub fn request_location(
        &mut self,
        bike_id: u32,
        longitude: f32,
        latitude: f32,
        battery: f32,
    ) -> bool {
        self.execute(&RequestIntent::ReportLocation {
            bike_id,
            longitude,
            latitude,
            battery,
        })
    }

    /// Report that no position could be acquired
    pub fn request_location_failed(&mut self, bike_id: u32, battery: f32) -> bool {
        self.execute(&RequestIntent::ReportLocationFailed { bike_id, battery })
    }

    /// Report a low battery
    pub fn request_low_battery(&mut self, bike_id: u32, battery: f32) -> bool {
        self.execute(&RequestIntent::ReportLowBattery { bike_id, battery })
    }

    /// Send one request and decode the reply
    ///
    /// Returns `true` if the reply arrived and decoded and the modem was
    /// left idle afterwards. A reply followed by a failed teardown returns
    /// `false` but stays readable through [`response`](Self::response).
    pub fn execute(&mut self, intent: &RequestIntent) -> bool {
        self.send(intent);
        self.has_response && !self.teardown_failed
    }

    /// Send one request and return its typed outcome
    pub fn send(&mut self, intent: &RequestIntent) -> ResponseOutcome {
        self.reset_response();
        let outcome = self.perform(intent);
        // Only a decoded reply leaves the information band
        self.has_response = !outcome.is_transport_error();
        self.outcome = Some(outcome.clone());
        outcome
    }

    fn perform(&mut self, intent: &RequestIntent) -> ResponseOutcome {
        let url = match intent.to_url(&self.config.server_url) {
            Ok(url) => url,
            Err(e) => {
                error!("cannot build request url: {}", e);
                return ResponseOutcome::Transport(TransportError::Status);
            }
        };

        debug!("request {}", intent.code().to_u16());

        let mut buf = [0u8; REPLY_BUF_LEN];
        let len = match self.run_steps(url.as_str(), &mut buf) {
            Ok(len) => len.min(REPLY_BUF_LEN),
            Err(step) => {
                error!("modem step {} failed", step.name());
                self.failed_step = Some(step);
                self.teardown();
                return ResponseOutcome::Transport(TransportError::RequestOvertime);
            }
        };

        if len == 0 {
            warn!("empty reply");
            self.teardown();
            return ResponseOutcome::Transport(TransportError::InvalidResponse);
        }

        match decode(&buf[..len], self.config.decode_policy()) {
            Ok(outcome) => {
                info!("reply {}", outcome.code().to_u16());
                if !self.teardown() {
                    warn!("teardown failed after reply");
                    self.teardown_failed = true;
                }
                outcome
            }
            Err(e) => {
                warn!("reply decode failed: {}", e);
                self.teardown();
                ResponseOutcome::Transport(TransportError::Decode)
            }
        }
    }

    /// Check if the last request produced a decoded reply
    pub fn has_response(&self) -> bool {
        self.has_response
    }

    /// Decoded reply of the last request
    pub fn response(&self) -> Option<&ResponseOutcome> {
        if self.has_response {
            self.outcome.as_ref()
        } else {
            None
        }
    }

    /// Outcome of the last request, including transport failures
    pub fn outcome(&self) -> Option<&ResponseOutcome> {
        self.outcome.as_ref()
    }

    /// Take the transport error of the last request
    ///
    /// Clears the response flag.
    pub fn error(&mut self) -> Option<TransportError> {
        let err = self.outcome.as_ref().and_then(ResponseOutcome::transport_error)?;
        self.has_response = false;
        Some(err)
    }

    /// Ride details of the last reply
    pub fn details(&self) -> Option<&RideDetails> {
        self.response().and_then(ResponseOutcome::details)
    }

    /// Rider id of the last reply
    pub fn user_id(&self) -> Option<&str> {
        self.details().map(|d| d.user_id.as_str())
    }

    /// Account balance of the last reply
    pub fn balance(&self) -> Option<&str> {
        self.details().map(|d| d.balance.as_str())
    }

    /// Ride duration of the last reply
    pub fn duration(&self) -> Option<&str> {
        self.details().map(|d| d.duration.as_str())
    }

    /// Step that failed during the last request
    pub fn last_failed_step(&self) -> Option<TransportStep> {
        self.failed_step
    }

    /// Check if the modem could not be left idle after the last reply
    pub fn teardown_failed(&self) -> bool {
        self.teardown_failed
    }

    /// Forget the last reply and make sure the modem is idle
    ///
    /// The teardown commands are sent whether or not anything is open;
    /// the modem answers an error for those that are not.
    pub fn reset_response(&mut self) {
        self.outcome = None;
        self.has_response = false;
        self.failed_step = None;
        self.teardown_failed = false;
        let _ = self.modem.http_terminate();
        let _ = self.modem.close_bearer();
    }

    fn run_steps(&mut self, url: &str, buf: &mut [u8]) -> Result<usize, TransportStep> {
        let short = self.config.short_settle_ms;
        let long = self.config.long_settle_ms;

        self.step(TransportStep::AttachBearer, short, |m| m.attach_bearer())?;
        self.step(TransportStep::OpenBearer, long, |m| m.open_bearer())?;
        self.step(TransportStep::InitHttp, short, |m| m.http_init())?;
        self.step(TransportStep::BindBearer, short, |m| m.http_bind_bearer())?;
        self.step(TransportStep::SetUrl, short, |m| m.http_set_url(url))?;
        self.step(TransportStep::Action, short, |m| m.http_action())?;
        self.step(TransportStep::Read, short, |m| m.http_read(buf))
    }

    /// Run one modem command and wait for it to settle
    ///
    /// `settle_ms` applies on success; failures always use the short delay.
    fn step<T>(
        &mut self,
        step: TransportStep,
        settle_ms: u32,
        op: impl FnOnce(&mut M) -> Result<T, M::Error>,
    ) -> Result<T, TransportStep> {
        let result = op(&mut self.modem);
        let settle = if result.is_ok() {
            settle_ms
        } else {
            self.config.short_settle_ms
        };
        self.delay.delay_ms(settle);
        result.map_err(|_| step)
    }

    /// Close the HTTP service and the bearer
    ///
    /// Both commands are always attempted. Returns `true` if both succeeded.
    fn teardown(&mut self) -> bool {
        let terminated = self.modem.http_terminate().is_ok();
        self.delay.delay_ms(self.config.short_settle_ms);
        let closed = self.modem.close_bearer().is_ok();
        self.delay.delay_ms(self.config.short_settle_ms);
        terminated && closed
    }
}
