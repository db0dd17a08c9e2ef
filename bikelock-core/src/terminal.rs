//! Terminal loop coordinating card handling, requests and location reports
//!
//! The terminal is the central brain that:
//! - Debounces the card reader and turns a confirmed card into a rent or
//!   return request
//! - Tracks the rental phase from the server's replies
//! - Releases the lock when a rental starts
//! - Sends periodic location and battery reports
//! - Tells the rider what happened

use embedded_hal::delay::DelayNs;

use bikelock_protocol::{CardUid, RequestIntent, ResponseCode, ResponseOutcome};

use crate::card::{CardDetector, CardEvent};
use crate::comm::HttpCom;
use crate::config::TerminalConfig;
use crate::location::{Fix, LocationScheduler};
use crate::state::{RentalEvent, RentalPhase, RentalState};
use crate::traits::{
    BatteryGauge, CardReader, Clock, DisplayError, LockActuator, Modem, PositionSource,
    StatusDisplay,
};

/// Peripherals the terminal drives
pub struct Hardware<R, G, B, S, L, C, M, D> {
    pub reader: R,
    pub gnss: G,
    pub battery: B,
    pub display: S,
    pub lock: L,
    pub clock: C,
    pub modem: M,
    pub delay: D,
}

/// Result of a location report
#[derive(Debug, Clone, PartialEq)]
pub struct LocationReport {
    /// Fix sent to the server, if one was acquired
    pub fix: Option<Fix>,
    /// Battery level sent with the report (0 if the gauge failed)
    pub battery: f32,
    /// Outcome of the location or location-failed request
    pub outcome: ResponseOutcome,
    /// Outcome of the low-battery request, if one was sent
    pub low_battery: Option<ResponseOutcome>,
}

/// What happened during one poll cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Card event of this cycle
    pub card: CardEvent,
    /// Outcome of the rent or return request, if one was sent
    pub outcome: Option<ResponseOutcome>,
    /// Location report, if one was due
    pub location: Option<LocationReport>,
}

/// Bike-share lock terminal
pub struct Terminal<R, G, B, S, L, C, M, D>
where
    M: Modem,
    D: DelayNs,
{
    config: TerminalConfig,
    rental: RentalState,
    detector: CardDetector,
    scheduler: LocationScheduler,
    com: HttpCom<M, D>,
    reader: R,
    gnss: G,
    battery: B,
    display: S,
    lock: L,
    clock: C,
}

impl<R, G, B, S, L, C, M, D> Terminal<R, G, B, S, L, C, M, D>
where
    R: CardReader,
    G: PositionSource,
    B: BatteryGauge,
    S: StatusDisplay,
    L: LockActuator,
    C: Clock,
    M: Modem,
    D: DelayNs,
{
    /// Create a terminal in the idle phase
    ///
    /// The first location report is due one idle period after creation.
    pub fn new(config: TerminalConfig, hw: Hardware<R, G, B, S, L, C, M, D>) -> Self {
        let now = hw.clock.now_ms();
        info!("terminal for bike {} starting", config.bike_id);
        Self {
            rental: RentalState::default(),
            detector: CardDetector::new(config.debounce),
            scheduler: LocationScheduler::new(config.schedule, now),
            com: HttpCom::new(hw.modem, hw.delay, config.com.clone()),
            config,
            reader: hw.reader,
            gnss: hw.gnss,
            battery: hw.battery,
            display: hw.display,
            lock: hw.lock,
            clock: hw.clock,
        }
    }

    /// Current rental phase
    pub fn phase(&self) -> RentalPhase {
        self.rental.phase()
    }

    /// Force the rental phase (restoring state after a reboot)
    pub fn set_phase(&mut self, phase: RentalPhase) {
        info!("rental phase set to {}", phase);
        self.rental.set_phase(phase);
    }

    /// Terminal configuration
    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// Card detector
    pub fn detector(&self) -> &CardDetector {
        &self.detector
    }

    /// Location scheduler
    pub fn scheduler(&self) -> &LocationScheduler {
        &self.scheduler
    }

    /// Communication client
    pub fn com(&self) -> &HttpCom<M, D> {
        &self.com
    }

    /// Card reader
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Status display
    pub fn display(&self) -> &S {
        &self.display
    }

    /// Lock actuator
    pub fn lock(&self) -> &L {
        &self.lock
    }

    /// Run one poll cycle
    pub fn poll_cycle(&mut self) -> CycleReport {
        // No location reports while a rider is at the reader
        if self.detector.is_active() {
            self.scheduler.pause();
        } else {
            self.scheduler.resume();
        }

        let card = self.detector.poll(&mut self.reader, self.rental.phase());
        let outcome = match card {
            CardEvent::Confirmed(uid) => self.handle_card(uid),
            event if event.is_error() => {
                Self::check_display(self.display.show_card_event(event));
                None
            }
            _ => None,
        };

        let location = if self.scheduler.needs_update(self.clock.now_ms(), self.rental.phase()) {
            Some(self.report_location())
        } else {
            None
        };

        self.reader.halt();
        if self.display.is_displaying() {
            Self::check_display(self.display.clear());
        }

        CycleReport {
            card,
            outcome,
            location,
        }
    }

    fn handle_card(&mut self, uid: CardUid) -> Option<ResponseOutcome> {
        match self.rental.phase() {
            RentalPhase::Idle => Some(self.rent(uid)),
            RentalPhase::Rented => Some(self.return_bike(uid)),
            _ => None,
        }
    }

    fn rent(&mut self, card: CardUid) -> ResponseOutcome {
        self.transition(RentalEvent::RentRequested);
        Self::check_display(self.display.show_wait());

        let outcome = self.com.send(&RequestIntent::Rent {
            bike_id: self.config.bike_id,
            card,
        });
        let event = match outcome {
            ResponseOutcome::RentSuccess(_) => RentalEvent::RentGranted,
            ResponseOutcome::Transport(_) => RentalEvent::RequestFailed,
            _ => RentalEvent::RentRefused,
        };
        self.transition(event);

        if event == RentalEvent::RentGranted && self.lock.pulse().is_err() {
            error!("lock release failed");
        }

        Self::check_display(self.display.show_outcome(&outcome));
        self.com.reset_response();
        outcome
    }

    fn return_bike(&mut self, card: CardUid) -> ResponseOutcome {
        self.transition(RentalEvent::ReturnRequested);
        Self::check_display(self.display.show_wait());

        let outcome = self.com.send(&RequestIntent::Return {
            bike_id: self.config.bike_id,
            card,
        });
        let event = match outcome {
            ResponseOutcome::ReturnSuccess(_) => RentalEvent::ReturnAccepted,
            ResponseOutcome::Transport(_) => RentalEvent::RequestFailed,
            _ => RentalEvent::ReturnRefused,
        };
        self.transition(event);

        Self::check_display(self.display.show_outcome(&outcome));
        self.com.reset_response();
        outcome
    }

    fn report_location(&mut self) -> LocationReport {
        let bike_id = self.config.bike_id;
        let level = match self.battery.level_percent() {
            Ok(level) => Some(level),
            Err(_) => {
                warn!("battery read failed");
                None
            }
        };
        let battery = level.unwrap_or(0.0);

        let fix = self
            .scheduler
            .acquire(&mut self.gnss, &self.clock, self.com.delay_mut());

        let intent = match fix {
            Some(fix) => RequestIntent::ReportLocation {
                bike_id,
                longitude: fix.longitude,
                latitude: fix.latitude,
                battery,
            },
            None => RequestIntent::ReportLocationFailed { bike_id, battery },
        };
        let outcome = self.com.send(&intent);
        self.com.reset_response();
        self.apply_availability(&outcome);

        let low_battery = match level {
            Some(level) if level < self.config.low_battery_percent => {
                warn!("battery low: {}%", level);
                let outcome = self
                    .com
                    .send(&RequestIntent::ReportLowBattery { bike_id, battery });
                self.com.reset_response();
                Some(outcome)
            }
            _ => None,
        };

        LocationReport {
            fix,
            battery,
            outcome,
            low_battery,
        }
    }

    /// Follow the server's availability flag on location replies
    fn apply_availability(&mut self, outcome: &ResponseOutcome) {
        if !self.config.com.distinct_unavailable_location_code {
            return;
        }
        match outcome.code() {
            ResponseCode::LocationSuccessNotAvailable => {
                self.transition(RentalEvent::MarkedUnavailable);
            }
            ResponseCode::LocationSuccess if self.rental.phase() == RentalPhase::Unavailable => {
                self.transition(RentalEvent::MarkedAvailable);
            }
            _ => {}
        }
    }

    fn transition(&mut self, event: RentalEvent) {
        let from = self.rental.phase();
        let to = self.rental.apply(event);
        if from != to {
            info!("rental phase {} -> {}", from, to);
        }
    }

    fn check_display(result: Result<(), DisplayError>) {
        if let Err(e) = result {
            warn!("display error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::minutes;
    use crate::mock::{
        MockBattery, MockDisplay, MockGnss, MockLock, MockModem, MockReader, Shown, SimClock,
        SimDelay,
    };
    use core::cell::Cell;

    const CARD: u32 = 0x00C0_FFEE;
    const RENT_OK: &[u8] = br#"{"state":110,"userID":"2015001","balance":"12.50","duration":""}"#;
    const RETURN_OK: &[u8] =
        br#"{"state":210,"userID":"2015001","balance":"11.50","duration":"00:25"}"#;

    type TestTerminal<'a> = Terminal<
        MockReader,
        MockGnss,
        MockBattery,
        MockDisplay,
        MockLock,
        SimClock<'a>,
        MockModem,
        SimDelay<'a>,
    >;

    struct Setup {
        reader: MockReader,
        gnss: MockGnss,
        battery: Option<f32>,
        modem: MockModem,
        config: TerminalConfig,
    }

    impl Default for Setup {
        fn default() -> Self {
            Self {
                reader: MockReader::new(),
                gnss: MockGnss::fix_after(0, 31.2304, 121.4737),
                battery: Some(80.0),
                modem: MockModem::new(),
                config: TerminalConfig {
                    bike_id: 7,
                    ..TerminalConfig::default()
                },
            }
        }
    }

    fn terminal(setup: Setup, now: &Cell<u32>) -> TestTerminal<'_> {
        Terminal::new(
            setup.config,
            Hardware {
                reader: setup.reader,
                gnss: setup.gnss,
                battery: MockBattery(setup.battery),
                display: MockDisplay::default(),
                lock: MockLock::default(),
                clock: SimClock(now),
                modem: setup.modem,
                delay: SimDelay(now),
            },
        )
    }

    /// Present a card long enough to confirm it and return the confirming cycle
    fn confirm_card(t: &mut TestTerminal<'_>) -> CycleReport {
        for _ in 0..3 {
            let report = t.poll_cycle();
            assert!(report.outcome.is_none());
        }
        t.poll_cycle()
    }

    fn card_setup(reply: &[u8]) -> Setup {
        let mut setup = Setup::default();
        setup.reader.present(CARD, 4);
        setup.modem.push_reply(reply);
        setup
    }

    #[test]
    fn test_rent_success_releases_lock() {
        let now = Cell::new(0);
        let mut t = terminal(card_setup(RENT_OK), &now);

        let report = confirm_card(&mut t);
        assert_eq!(report.card, CardEvent::Confirmed(CardUid::new(CARD).unwrap()));
        assert_eq!(report.outcome.unwrap().code(), ResponseCode::RentSuccess);
        assert_eq!(t.phase(), RentalPhase::Rented);
        assert_eq!(t.lock().pulses, 1);
        assert_eq!(
            t.display().shown,
            [Shown::Wait, Shown::Outcome(ResponseCode::RentSuccess)]
        );
        assert_eq!(t.display().details, ["2015001"]);
        assert!(!t.display().is_displaying());
        assert_eq!(t.reader().halts, 4);
        assert!(t.com().modem().urls[0].ends_with("?get1=state=10,bikeID=7,cardSerial=12648430"));
    }

    #[test]
    fn test_rent_refused_rolls_back() {
        let now = Cell::new(0);
        let mut t = terminal(card_setup(br#"{"state":122}"#), &now);

        let report = confirm_card(&mut t);
        assert_eq!(
            report.outcome.unwrap().code(),
            ResponseCode::RentFailNegativeBalance
        );
        assert_eq!(t.phase(), RentalPhase::Idle);
        assert_eq!(t.lock().pulses, 0);
    }

    #[test]
    fn test_rent_transport_failure_rolls_back() {
        let now = Cell::new(0);
        let mut setup = card_setup(RENT_OK);
        setup.modem.fail_at = Some(crate::comm::TransportStep::OpenBearer);
        let mut t = terminal(setup, &now);

        let report = confirm_card(&mut t);
        assert_eq!(
            report.outcome.unwrap().code(),
            ResponseCode::ErrorRequestOvertime
        );
        assert_eq!(t.phase(), RentalPhase::Idle);
        assert_eq!(t.lock().pulses, 0);
        assert!(!t.com().has_response());
    }

    #[test]
    fn test_return_success() {
        let now = Cell::new(0);
        let mut t = terminal(card_setup(RETURN_OK), &now);
        t.set_phase(RentalPhase::Rented);

        let report = confirm_card(&mut t);
        let outcome = report.outcome.unwrap();
        assert_eq!(outcome.details().unwrap().duration.as_str(), "00:25");
        assert_eq!(t.phase(), RentalPhase::Idle);
        assert_eq!(t.lock().pulses, 0);
        assert!(t.com().modem().urls[0].contains("?get1=state=20,"));
    }

    #[test]
    fn test_return_refused_stays_rented() {
        let now = Cell::new(0);
        let mut t = terminal(card_setup(br#"{"state":220}"#), &now);
        t.set_phase(RentalPhase::Rented);

        confirm_card(&mut t);
        assert_eq!(t.phase(), RentalPhase::Rented);
    }

    #[test]
    fn test_unavailable_rejects_card() {
        let now = Cell::new(0);
        let mut setup = Setup::default();
        setup.reader.present(CARD, 1);
        let mut t = terminal(setup, &now);
        t.set_phase(RentalPhase::Unavailable);

        let report = t.poll_cycle();
        assert_eq!(report.card, CardEvent::ErrorVehicleUnavailable);
        assert!(report.outcome.is_none());
        assert_eq!(
            t.display().shown,
            [Shown::Card(CardEvent::ErrorVehicleUnavailable)]
        );
        assert_eq!(t.display().clears, 1);
        assert_eq!(t.com().modem().request_count(), 0);
    }

    #[test]
    fn test_location_report_when_due() {
        let now = Cell::new(0);
        let mut setup = Setup::default();
        setup.modem.push_reply(br#"{"state":310}"#);
        let mut t = terminal(setup, &now);

        assert!(t.poll_cycle().location.is_none());

        now.set(minutes(10));
        let report = t.poll_cycle().location.unwrap();
        assert_eq!(report.outcome.code(), ResponseCode::LocationSuccess);
        assert!(report.fix.is_some());
        assert!(report.low_battery.is_none());
        assert_eq!(
            t.com().modem().urls,
            ["http://localhost/test.php?get2=state=30,bikeID=7,longitude=121.473701,latitude=31.230400,batteryLevel=80.00"]
        );

        // Stamped at the end of the attempt, so not due again right away
        assert!(t.poll_cycle().location.is_none());
    }

    #[test]
    fn test_location_failed_and_low_battery() {
        let now = Cell::new(0);
        let mut setup = Setup::default();
        setup.gnss = MockGnss::never();
        setup.battery = Some(12.5);
        setup.modem.push_reply(br#"{"state":330}"#);
        setup.modem.push_reply(br#"{"state":410}"#);
        let mut t = terminal(setup, &now);
        t.set_phase(RentalPhase::Rented);

        now.set(minutes(1));
        let report = t.poll_cycle().location.unwrap();
        assert!(report.fix.is_none());
        assert_eq!(report.outcome.code(), ResponseCode::LocationFail);
        assert_eq!(
            report.low_battery.unwrap().code(),
            ResponseCode::LowBatterySuccess
        );

        let urls = &t.com().modem().urls;
        assert!(urls[0].ends_with("?get3=state=31,bikeID=7,batteryLevel=12.50"));
        assert!(urls[1].ends_with("?get3=state=40,bikeID=7,batteryLevel=12.50"));
    }

    #[test]
    fn test_battery_read_failure_skips_low_battery() {
        let now = Cell::new(0);
        let mut setup = Setup::default();
        setup.battery = None;
        setup.modem.push_reply(br#"{"state":310}"#);
        let mut t = terminal(setup, &now);

        now.set(minutes(10));
        let report = t.poll_cycle().location.unwrap();
        assert_eq!(report.battery, 0.0);
        assert!(report.low_battery.is_none());
        assert_eq!(t.com().modem().request_count(), 1);
    }

    #[test]
    fn test_availability_follows_location_replies() {
        let now = Cell::new(0);
        let mut setup = Setup::default();
        setup.config.com.distinct_unavailable_location_code = true;
        setup.modem.push_reply(br#"{"state":320}"#);
        setup.modem.push_reply(br#"{"state":310}"#);
        let mut t = terminal(setup, &now);

        now.set(minutes(10));
        t.poll_cycle();
        assert_eq!(t.phase(), RentalPhase::Unavailable);

        now.set(now.get() + minutes(5));
        t.poll_cycle();
        assert_eq!(t.phase(), RentalPhase::Idle);
    }

    #[test]
    fn test_unavailable_code_ignored_without_policy() {
        let now = Cell::new(0);
        let mut setup = Setup::default();
        setup.modem.push_reply(br#"{"state":320}"#);
        let mut t = terminal(setup, &now);

        now.set(minutes(10));
        let report = t.poll_cycle().location.unwrap();
        assert_eq!(report.outcome.code(), ResponseCode::ErrorDecode);
        assert_eq!(t.phase(), RentalPhase::Idle);
    }

    #[test]
    fn test_no_location_report_during_card_session() {
        let now = Cell::new(0);
        let mut setup = Setup::default();
        setup.reader.present(CARD, 2).absent(6);
        setup.modem.push_reply(br#"{"state":310}"#);
        let mut t = terminal(setup, &now);

        assert_eq!(t.poll_cycle().card, CardEvent::Detected);
        now.set(minutes(10));

        // Session in progress until removal is confirmed
        for _ in 0..7 {
            assert!(t.poll_cycle().location.is_none());
        }
        assert!(!t.detector().is_active());
        assert!(t.poll_cycle().location.is_some());
    }
}
