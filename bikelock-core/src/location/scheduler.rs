//! Location update scheduler
//!
//! Position reports go out on a phase-dependent period: every minute while
//! the bike is rented, every ten minutes while it is parked, every five
//! while the server has marked it unavailable. Reporting is paused while a
//! card session is in progress so the rider never waits on the GPS.

use embedded_hal::delay::DelayNs;

use super::fix::{Fix, NO_FIX};
use crate::clock::{elapsed, minutes, Millis};
use crate::state::RentalPhase;
use crate::traits::{Clock, PositionSource};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default acquisition timeout in milliseconds
pub const ACQUIRE_TIMEOUT_MS: Millis = 30_000;

/// Default delay between fix polls in milliseconds
pub const ACQUIRE_POLL_MS: u32 = 200;

/// Report periods and acquisition limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleConfig {
    /// Report period while rented
    pub rented_interval_ms: Millis,
    /// Report period while parked
    pub idle_interval_ms: Millis,
    /// Report period while marked unavailable
    pub unavailable_interval_ms: Millis,
    /// Give up on a fix after this long
    pub acquire_timeout_ms: Millis,
    /// Delay between fix polls
    pub acquire_poll_ms: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            rented_interval_ms: minutes(1),
            idle_interval_ms: minutes(10),
            unavailable_interval_ms: minutes(5),
            acquire_timeout_ms: ACQUIRE_TIMEOUT_MS,
            acquire_poll_ms: ACQUIRE_POLL_MS,
        }
    }
}

impl ScheduleConfig {
    /// Report period for a rental phase
    ///
    /// Phases with a request in flight are never scheduled.
    pub fn interval_for(&self, phase: RentalPhase) -> Option<Millis> {
        match phase {
            RentalPhase::Rented => Some(self.rented_interval_ms),
            RentalPhase::Idle => Some(self.idle_interval_ms),
            RentalPhase::Unavailable => Some(self.unavailable_interval_ms),
            RentalPhase::RentInProgress | RentalPhase::ReturnInProgress => None,
        }
    }
}

/// Scheduler bookkeeping
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScheduleState {
    /// When the last attempt finished
    pub last_update: Millis,
    /// Updates suppressed while a card session runs
    pub paused: bool,
    /// Latitude of the last attempt, or [`NO_FIX`]
    pub last_latitude: f32,
    /// Longitude of the last attempt, or [`NO_FIX`]
    pub last_longitude: f32,
}

/// Location update scheduler
#[derive(Debug, Clone)]
pub struct LocationScheduler {
    config: ScheduleConfig,
    state: ScheduleState,
    attempt_started: Option<Millis>,
}

impl LocationScheduler {
    /// Create a scheduler; the first report is due one period after `now`
    pub fn new(config: ScheduleConfig, now: Millis) -> Self {
        Self {
            config,
            state: ScheduleState {
                last_update: now,
                paused: false,
                last_latitude: NO_FIX,
                last_longitude: NO_FIX,
            },
            attempt_started: None,
        }
    }

    /// Scheduler configuration
    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Current bookkeeping
    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    /// Check whether a location report is due
    ///
    /// If the clock has wrapped since the last update, the schedule is
    /// re-armed at `now` and nothing is due.
    pub fn needs_update(&mut self, now: Millis, phase: RentalPhase) -> bool {
        let Some(since) = elapsed(self.state.last_update, now) else {
            debug!("clock wrapped, re-arming location schedule");
            self.state.last_update = now;
            return false;
        };

        if self.state.paused {
            return false;
        }

        match self.config.interval_for(phase) {
            Some(interval) => since >= interval,
            None => false,
        }
    }

    /// Start an acquisition attempt, forgetting the previous fix
    pub fn begin_attempt(&mut self, now: Millis) {
        self.state.last_latitude = NO_FIX;
        self.state.last_longitude = NO_FIX;
        self.attempt_started = Some(now);
    }

    /// Finish an acquisition attempt
    ///
    /// The update time is stamped whether or not a fix was obtained, so a
    /// failed attempt waits a full period before the next one.
    pub fn complete_attempt(&mut self, fix: Option<Fix>, now: Millis) {
        if let Some(fix) = fix {
            self.state.last_latitude = fix.latitude;
            self.state.last_longitude = fix.longitude;
        }
        if let Some(took) = self.attempt_started.take().and_then(|start| elapsed(start, now)) {
            debug!("location attempt took {} ms", took);
        }
        self.state.last_update = now;
    }

    /// Suppress updates
    pub fn pause(&mut self) {
        self.state.paused = true;
    }

    /// Allow updates again
    pub fn resume(&mut self) {
        self.state.paused = false;
    }

    /// Check if updates are suppressed
    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Fix from the last attempt, if it got one
    pub fn last_fix(&self) -> Option<Fix> {
        Fix::new(self.state.last_latitude, self.state.last_longitude)
    }

    /// Run one time-boxed acquisition attempt
    ///
    /// The receiver is enabled for the duration of the attempt and always
    /// disabled afterwards. A clock wrap during the attempt ends it as a
    /// timeout.
    pub fn acquire<G, C, D>(&mut self, gnss: &mut G, clock: &C, delay: &mut D) -> Option<Fix>
    where
        G: PositionSource,
        C: Clock,
        D: DelayNs,
    {
        let start = clock.now_ms();
        self.begin_attempt(start);
        gnss.enable();

        let fix = loop {
            if let Some(fix) = gnss.poll().filter(Fix::is_valid) {
                break Some(fix);
            }
            match elapsed(start, clock.now_ms()) {
                Some(waited) if waited < self.config.acquire_timeout_ms => {
                    delay.delay_ms(self.config.acquire_poll_ms);
                }
                _ => break None,
            }
        };

        gnss.disable();
        if fix.is_none() {
            warn!("no position fix within {} ms", self.config.acquire_timeout_ms);
        }
        self.complete_attempt(fix, clock.now_ms());
        fix
    }
}
