//! Mock collaborators for unit tests

use core::cell::Cell;
use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use bikelock_protocol::{CardUid, ResponseCode, ResponseOutcome};
use embedded_hal::delay::DelayNs;

use crate::card::CardEvent;
use crate::clock::Millis;
use crate::comm::TransportStep;
use crate::location::Fix;
use crate::traits::{
    BatteryGauge, CardReader, Clock, DisplayError, LockActuator, Modem, PositionSource,
    StatusDisplay,
};

/// Clock reading a shared simulated time
pub struct SimClock<'a>(pub &'a Cell<Millis>);

impl Clock for SimClock<'_> {
    fn now_ms(&self) -> Millis {
        self.0.get()
    }
}

/// Delay that advances the shared simulated time instead of blocking
pub struct SimDelay<'a>(pub &'a Cell<Millis>);

impl SimDelay<'_> {
    fn advance(&mut self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(ns / 1_000_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(us / 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}

/// One recorded modem command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemCall {
    Step(TransportStep),
    Terminate,
    CloseBearer,
}

/// Modem that records commands and replays canned replies
#[derive(Default)]
pub struct MockModem {
    pub calls: Vec<ModemCall>,
    pub urls: Vec<String>,
    pub fail_at: Option<TransportStep>,
    pub fail_teardown: bool,
    pub replies: VecDeque<Vec<u8>>,
}

impl MockModem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(reply: &[u8]) -> Self {
        let mut modem = Self::new();
        modem.push_reply(reply);
        modem
    }

    pub fn failing_at(step: TransportStep) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::default()
        }
    }

    pub fn push_reply(&mut self, reply: &[u8]) {
        self.replies.push_back(reply.to_vec());
    }

    /// Number of requests that reached the URL step
    pub fn request_count(&self) -> usize {
        self.urls.len()
    }

    fn run(&mut self, step: TransportStep) -> Result<(), ()> {
        self.calls.push(ModemCall::Step(step));
        if self.fail_at == Some(step) {
            Err(())
        } else {
            Ok(())
        }
    }
}

impl Modem for MockModem {
    type Error = ();

    fn attach_bearer(&mut self) -> Result<(), ()> {
        self.run(TransportStep::AttachBearer)
    }

    fn open_bearer(&mut self) -> Result<(), ()> {
        self.run(TransportStep::OpenBearer)
    }

    fn http_init(&mut self) -> Result<(), ()> {
        self.run(TransportStep::InitHttp)
    }

    fn http_bind_bearer(&mut self) -> Result<(), ()> {
        self.run(TransportStep::BindBearer)
    }

    fn http_set_url(&mut self, url: &str) -> Result<(), ()> {
        self.run(TransportStep::SetUrl)?;
        self.urls.push(url.into());
        Ok(())
    }

    fn http_action(&mut self) -> Result<(), ()> {
        self.run(TransportStep::Action)
    }

    fn http_read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        self.run(TransportStep::Read)?;
        let reply = self.replies.pop_front().unwrap_or_default();
        let len = reply.len().min(buf.len());
        buf[..len].copy_from_slice(&reply[..len]);
        Ok(len)
    }

    fn http_terminate(&mut self) -> Result<(), ()> {
        self.calls.push(ModemCall::Terminate);
        if self.fail_teardown {
            Err(())
        } else {
            Ok(())
        }
    }

    fn close_bearer(&mut self) -> Result<(), ()> {
        self.calls.push(ModemCall::CloseBearer);
        if self.fail_teardown {
            Err(())
        } else {
            Ok(())
        }
    }
}

/// GPS receiver that gets a fix after a number of polls, or never
pub struct MockGnss {
    pub enabled: bool,
    pub enable_count: u32,
    pub poll_count: u32,
    fix_after: Option<u32>,
    fix: Fix,
}

impl MockGnss {
    pub fn fix_after(polls: u32, latitude: f32, longitude: f32) -> Self {
        Self {
            enabled: false,
            enable_count: 0,
            poll_count: 0,
            fix_after: Some(polls),
            fix: Fix {
                latitude,
                longitude,
            },
        }
    }

    pub fn never() -> Self {
        Self {
            fix_after: None,
            ..Self::fix_after(0, 0.0, 0.0)
        }
    }
}

impl PositionSource for MockGnss {
    fn enable(&mut self) {
        self.enabled = true;
        self.enable_count += 1;
    }

    fn poll(&mut self) -> Option<Fix> {
        assert!(self.enabled, "polled while disabled");
        self.poll_count += 1;
        match self.fix_after {
            Some(n) if self.poll_count > n => Some(self.fix),
            _ => None,
        }
    }

    fn disable(&mut self) {
        self.enabled = false;
    }
}

/// Reader replaying one sample per poll; an exhausted script means no card
#[derive(Default)]
pub struct MockReader {
    script: VecDeque<Option<u32>>,
    current: Option<u32>,
    pub halts: u32,
}

impl MockReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Present `uid` for `polls` consecutive polls
    pub fn present(&mut self, uid: u32, polls: usize) -> &mut Self {
        self.script.extend(core::iter::repeat(Some(uid)).take(polls));
        self
    }

    /// No card for `polls` consecutive polls
    pub fn absent(&mut self, polls: usize) -> &mut Self {
        self.script.extend(core::iter::repeat(None).take(polls));
        self
    }
}

impl CardReader for MockReader {
    fn poll_present(&mut self) -> bool {
        self.current = self.script.pop_front().flatten();
        self.current.is_some()
    }

    fn read_uid(&mut self) -> Option<CardUid> {
        self.current.and_then(CardUid::new)
    }

    fn halt(&mut self) {
        self.halts += 1;
    }
}

/// What the mock display was asked to show
#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Wait,
    Outcome(ResponseCode),
    Card(CardEvent),
}

#[derive(Default)]
pub struct MockDisplay {
    pub shown: Vec<Shown>,
    pub details: Vec<String>,
    pub clears: u32,
    displaying: bool,
}

impl StatusDisplay for MockDisplay {
    fn show_wait(&mut self) -> Result<(), DisplayError> {
        self.shown.push(Shown::Wait);
        self.displaying = true;
        Ok(())
    }

    fn show_outcome(&mut self, outcome: &ResponseOutcome) -> Result<(), DisplayError> {
        self.shown.push(Shown::Outcome(outcome.code()));
        if let Some(details) = outcome.details() {
            self.details.push(details.user_id.as_str().into());
        }
        self.displaying = true;
        Ok(())
    }

    fn show_card_event(&mut self, event: CardEvent) -> Result<(), DisplayError> {
        self.shown.push(Shown::Card(event));
        self.displaying = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.clears += 1;
        self.displaying = false;
        Ok(())
    }

    fn is_displaying(&self) -> bool {
        self.displaying
    }
}

#[derive(Default)]
pub struct MockLock {
    pub pulses: u32,
}

impl LockActuator for MockLock {
    type Error = ();

    fn pulse(&mut self) -> Result<(), ()> {
        self.pulses += 1;
        Ok(())
    }
}

/// Battery gauge with a fixed level; `None` fails the read
pub struct MockBattery(pub Option<f32>);

impl BatteryGauge for MockBattery {
    type Error = ();

    fn level_percent(&mut self) -> Result<f32, ()> {
        self.0.ok_or(())
    }
}
